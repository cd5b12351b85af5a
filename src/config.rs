//! Application configuration loaded from environment variables.
//!
//! - `GARANT_API_BASE_URL`: authority base URL (defaults to the hosted desk)
//! - `GARANT_USER_ID`: numeric id of the viewer
//! - `GARANT_WALLET_ADDRESS`: deposit address shown to the user
//! - `GARANT_API_TIMEOUT_MS`: per-request timeout, default 10000
//! - `GARANT_DEMO_MODE`: `1` or `true` to use the in-memory demo authority
//! - `GARANT_LIMITS_FILE`: optional JSON document overriding input limits

use std::path::Path;
use std::time::Duration;

use crate::guard::config::LimitsConfig;
use crate::models::UserId;

/// Default authority endpoint.
const DEFAULT_BASE_URL: &str = "https://garant-bot-mini-app-b961dcec28c0.herokuapp.com";

/// Default deposit wallet.
const DEFAULT_WALLET_ADDRESS: &str = "UQCow0sO7p9izwbvm8XMYlEfEirNEW-yXPqyS_rcTmS-GUtg";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub authority: AuthorityConfig,
    pub user_id: Option<UserId>,
    pub wallet_address: String,
    pub limits: LimitsConfig,
}

/// How to reach the authority.
#[derive(Debug)]
pub struct AuthorityConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub demo_mode: bool,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`GarantError::Config`](crate::GarantError::Config) if the user
/// id or timeout is not a valid number, the demo flag is not a boolean, or
/// the limits file cannot be loaded.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url =
        non_empty_var("GARANT_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let user_id = non_empty_var("GARANT_USER_ID")
        .map(|raw| {
            raw.trim().parse::<UserId>().map_err(|_| {
                crate::GarantError::Config(format!("GARANT_USER_ID is not an integer: {raw:?}"))
            })
        })
        .transpose()?;

    let timeout_ms = match non_empty_var("GARANT_API_TIMEOUT_MS") {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                return Err(crate::GarantError::Config(format!(
                    "GARANT_API_TIMEOUT_MS must be a positive integer, got {raw:?}"
                )));
            }
        },
        None => DEFAULT_TIMEOUT_MS,
    };

    let demo_mode = match non_empty_var("GARANT_DEMO_MODE") {
        Some(raw) => parse_flag(&raw).ok_or_else(|| {
            crate::GarantError::Config(format!("GARANT_DEMO_MODE is not a boolean: {raw:?}"))
        })?,
        None => false,
    };

    let wallet_address = non_empty_var("GARANT_WALLET_ADDRESS")
        .unwrap_or_else(|| DEFAULT_WALLET_ADDRESS.to_string());

    let limits = match non_empty_var("GARANT_LIMITS_FILE") {
        Some(path) => LimitsConfig::load(Path::new(&path))?,
        None => LimitsConfig::default(),
    };

    Ok(AppConfig {
        authority: AuthorityConfig {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            demo_mode,
        },
        user_id,
        wallet_address,
        limits,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rust_decimal_macros::dec;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 6] = [
        "GARANT_API_BASE_URL",
        "GARANT_USER_ID",
        "GARANT_WALLET_ADDRESS",
        "GARANT_API_TIMEOUT_MS",
        "GARANT_DEMO_MODE",
        "GARANT_LIMITS_FILE",
    ];

    /// Helper that temporarily sets env vars, runs `f`, then restores originals.
    ///
    /// Variables not listed are cleared for the duration of `f`. A process
    /// lock serializes callers so parallel tests never observe each
    /// other's values.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let originals: Vec<(&str, Option<String>)> = ALL_VARS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        for k in ALL_VARS {
            let value = vars.iter().find(|(name, _)| *name == k).and_then(|(_, v)| *v);
            // SAFETY: every env mutation in this module happens under ENV_LOCK.
            unsafe {
                match value {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values under the same lock.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_without_env_vars() {
        with_env(&[], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.authority.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.authority.timeout, Duration::from_secs(10));
            assert!(!config.authority.demo_mode);
            assert!(config.user_id.is_none());
            assert_eq!(config.wallet_address, DEFAULT_WALLET_ADDRESS);
            assert_eq!(config.limits, LimitsConfig::default());
        });
    }

    #[test]
    fn loads_values_from_env() {
        with_env(
            &[
                ("GARANT_API_BASE_URL", Some("http://localhost:5000")),
                ("GARANT_USER_ID", Some("777")),
                ("GARANT_API_TIMEOUT_MS", Some("2500")),
                ("GARANT_DEMO_MODE", Some("true")),
                ("GARANT_WALLET_ADDRESS", Some("UQtest")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.authority.base_url, "http://localhost:5000");
                assert_eq!(config.user_id, Some(UserId(777)));
                assert_eq!(config.authority.timeout, Duration::from_millis(2500));
                assert!(config.authority.demo_mode);
                assert_eq!(config.wallet_address, "UQtest");
            },
        );
    }

    #[test]
    fn rejects_non_numeric_user_id() {
        with_env(&[("GARANT_USER_ID", Some("alice"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("GARANT_USER_ID"));
        });
    }

    #[test]
    fn rejects_zero_timeout() {
        with_env(&[("GARANT_API_TIMEOUT_MS", Some("0"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("GARANT_API_TIMEOUT_MS"));
        });
    }

    #[test]
    fn rejects_unparsable_demo_flag() {
        with_env(&[("GARANT_DEMO_MODE", Some("maybe"))], || {
            assert!(fetch_config().is_err());
        });
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("GARANT_API_BASE_URL", Some("")),
                ("GARANT_USER_ID", Some("")),
                ("GARANT_DEMO_MODE", Some("")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.authority.base_url, DEFAULT_BASE_URL);
                assert!(config.user_id.is_none());
                assert!(!config.authority.demo_mode);
            },
        );
    }

    #[test]
    fn limits_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limits.json");
        std::fs::write(&path, r#"{"max_topup_amount": "500"}"#).unwrap();

        with_env(&[("GARANT_LIMITS_FILE", path.to_str())], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.limits.max_topup_amount, dec!(500));
            assert_eq!(config.limits.min_deal_amount, dec!(0.01));
        });
    }

    #[test]
    fn missing_limits_file_is_an_error() {
        with_env(&[("GARANT_LIMITS_FILE", Some("/nonexistent/limits.json"))], || {
            let err = fetch_config().unwrap_err();
            assert!(matches!(err, crate::GarantError::Config(_)));
        });
    }
}
