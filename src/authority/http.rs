//! JSON-over-HTTP authority client.
//!
//! Every operation is a `POST` of a flat JSON body to `<base>/api/<op>`.
//! The authority answers validation failures with a 4xx status and a
//! regular envelope, so a non-2xx reply is only a transport failure when
//! its body is not an envelope.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{Authority, Endpoint};
use crate::models::{
    AckData, BalanceSnapshot, DealsData, Envelope, HealthStatus, HistoryData,
    requests::{CreateDealRequest, DealActionRequest, TopupRequest, UserQuery, WithdrawRequest},
};
use crate::{GarantError, Result};

/// Authority reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    /// Builds a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GarantError::Config`] if the URL is empty or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(GarantError::Config("authority base URL is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GarantError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Queries `GET /api/health`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the authority is unreachable or
    /// answers with a non-2xx status.
    pub async fn health(&self) -> Result<HealthStatus> {
        let endpoint = Endpoint::Health;
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| transport(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GarantError::Transport(format!(
                "{}: HTTP {status}",
                endpoint.path()
            )));
        }

        let health: HealthStatus = response.json().await?;
        info!(status = %health.status, version = %health.version, "Authority health");
        Ok(health)
    }

    async fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<Envelope<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| transport(endpoint, &e))?;
        info!(endpoint = endpoint.path(), "Sent request");

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport(endpoint, &e))?;

        if status.is_success() {
            let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
                GarantError::MalformedResponse(format!("{}: {e}", endpoint.path()))
            })?;
            debug!(
                endpoint = endpoint.path(),
                success = envelope.success,
                "Received response"
            );
            return Ok(envelope);
        }

        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(envelope) if !envelope.success => {
                debug!(
                    endpoint = endpoint.path(),
                    %status,
                    "Authority rejected request"
                );
                Ok(envelope)
            }
            _ => {
                warn!(endpoint = endpoint.path(), %status, "Authority returned an error status");
                Err(GarantError::Transport(format!(
                    "{}: HTTP {status}",
                    endpoint.path()
                )))
            }
        }
    }
}

fn transport(endpoint: Endpoint, err: &reqwest::Error) -> GarantError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    warn!(endpoint = endpoint.path(), error = %err, "Authority {kind}");
    GarantError::Transport(format!("{}: {kind}: {err}", endpoint.path()))
}

impl Authority for HttpAuthority {
    async fn fetch_user(&self, query: &UserQuery) -> Result<Envelope<BalanceSnapshot>> {
        self.post(Endpoint::User, query).await
    }

    async fn fetch_deals(&self, query: &UserQuery) -> Result<Envelope<DealsData>> {
        self.post(Endpoint::Deals, query).await
    }

    async fn fetch_history(&self, query: &UserQuery) -> Result<Envelope<HistoryData>> {
        self.post(Endpoint::History, query).await
    }

    async fn submit_topup(&self, request: &TopupRequest) -> Result<Envelope<AckData>> {
        self.post(Endpoint::Topup, request).await
    }

    async fn submit_withdraw(&self, request: &WithdrawRequest) -> Result<Envelope<AckData>> {
        self.post(Endpoint::Withdraw, request).await
    }

    async fn submit_create_deal(&self, request: &CreateDealRequest) -> Result<Envelope<AckData>> {
        self.post(Endpoint::CreateDeal, request).await
    }

    async fn submit_deal_action(&self, request: &DealActionRequest) -> Result<Envelope<AckData>> {
        self.post(Endpoint::DealAction, request).await
    }
}
