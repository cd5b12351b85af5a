use std::process::ExitCode;

use clap::{Parser, Subcommand};
use garant::authority::demo::DemoAuthority;
use garant::authority::http::HttpAuthority;
use garant::authority::{Ack, Authority};
use garant::config::fetch_config;
use garant::desk::Desk;
use garant::engine::{
    HistoryFilter, filter_history, format_amount, parse_amount, project_balance,
    project_history_display,
};
use garant::guard::PreflightGuard;
use garant::models::{CURRENCY, DealAction, DealId, DealType};
use garant::{GarantError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "garant", version, about = "Escrow deal desk client")]
struct Cli {
    /// Use the in-memory demo authority instead of the network
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show total, available and frozen balance
    Balance,
    /// List deals with the actions available to you
    Deals,
    /// Show transaction history
    History {
        /// all, topup, withdraw, deal or commission
        #[arg(long, default_value = "all")]
        filter: HistoryFilter,
    },
    /// Request a top-up after sending funds to the deposit wallet
    Topup {
        amount: String,
        #[arg(long)]
        tx_hash: String,
    },
    /// Request a withdrawal
    Withdraw {
        amount: String,
        #[arg(long)]
        address: String,
    },
    /// Create a sell or buy deal
    CreateDeal {
        #[arg(long = "type")]
        deal_type: DealType,
        #[arg(long)]
        name: String,
        amount: String,
    },
    /// Cancel, join, send-gift or confirm. A deal shared by link can be
    /// joined by id before it appears in your list.
    Action {
        #[arg(long)]
        deal_id: DealId,
        #[arg(long)]
        action: DealAction,
    },
    /// Show the deposit wallet address
    Wallet,
    /// Check that the authority is up
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = fetch_config()?;
    let demo = cli.demo || config.authority.demo_mode;

    match cli.command {
        Command::Wallet => {
            println!("Deposit address: {}", config.wallet_address);
            return Ok(());
        }
        Command::Health if demo => {
            println!("demo mode, no authority to check");
            return Ok(());
        }
        Command::Health => {
            let authority =
                HttpAuthority::new(&config.authority.base_url, config.authority.timeout)?;
            let health = authority.health().await?;
            println!("{} (version {})", health.status, health.version);
            return Ok(());
        }
        _ => {}
    }

    let viewer = config.user_id.ok_or_else(|| {
        GarantError::Config("GARANT_USER_ID is required for this command".to_string())
    })?;
    let guard = PreflightGuard::new(config.limits.clone());

    if demo {
        info!(%viewer, "Using demo authority");
        run(&Desk::new(DemoAuthority::new(viewer), guard, viewer), cli.command).await
    } else {
        let authority = HttpAuthority::new(&config.authority.base_url, config.authority.timeout)?;
        info!(base_url = authority.base_url(), %viewer, "Using authority");
        run(&Desk::new(authority, guard, viewer), cli.command).await
    }
}

async fn run<A: Authority>(desk: &Desk<A>, command: Command) -> Result<()> {
    match command {
        Command::Balance => {
            let Some(snapshot) = desk.load_balance().await?.into_current() else {
                return Ok(());
            };
            let projection = project_balance(&snapshot);
            println!("Total:     {} {CURRENCY}", format_amount(projection.total));
            println!("Available: {} {CURRENCY}", format_amount(projection.available));
            println!("Frozen:    {} {CURRENCY}", format_amount(projection.frozen));
            for warning in &projection.warnings {
                println!("warning: {warning}");
            }
        }
        Command::Deals => {
            let Some(deals) = desk.load_deals().await?.into_current() else {
                return Ok(());
            };
            if deals.is_empty() {
                println!("No deals");
            }
            for deal in &deals {
                let actions: Vec<&str> = desk
                    .actions_for(deal)
                    .into_iter()
                    .map(|a| a.as_str())
                    .collect();
                println!(
                    "#{} {} [{}] {} {CURRENCY} {} actions: {}",
                    deal.id,
                    deal.name,
                    deal.deal_type,
                    format_amount(deal.sum),
                    deal.status,
                    if actions.is_empty() {
                        "none".to_string()
                    } else {
                        actions.join(", ")
                    }
                );
            }
        }
        Command::History { filter } => {
            let Some(history) = desk.load_history().await?.into_current() else {
                return Ok(());
            };
            let shown = filter_history(&history, filter);
            if shown.is_empty() {
                println!("No history");
            }
            for entry in shown {
                let row = project_history_display(entry);
                println!(
                    "{:>12} {CURRENCY}  {:<10} {} | {}",
                    row.formatted_amount,
                    entry.kind.as_str(),
                    entry.title,
                    entry.description
                );
            }
        }
        Command::Topup { amount, tx_hash } => {
            let amount = parse_amount(&amount)?;
            report(desk.submit_topup(amount, &tx_hash).await?);
        }
        Command::Withdraw { amount, address } => {
            let amount = parse_amount(&amount)?;
            let Some(balance) = desk.load_balance().await?.into_current() else {
                return Ok(());
            };
            report(desk.submit_withdraw(&balance, amount, &address).await?);
        }
        Command::CreateDeal {
            deal_type,
            name,
            amount,
        } => {
            let amount = parse_amount(&amount)?;
            let Some(balance) = desk.load_balance().await?.into_current() else {
                return Ok(());
            };
            report(desk.create_deal(&balance, deal_type, &name, amount).await?);
        }
        Command::Action { deal_id, action } => {
            let Some(balance) = desk.load_balance().await?.into_current() else {
                return Ok(());
            };
            let Some(deals) = desk.load_deals().await?.into_current() else {
                return Ok(());
            };
            report(
                desk.perform_action_by_id(&balance, &deals, &deal_id, action)
                    .await?,
            );
        }
        Command::Wallet | Command::Health => {}
    }
    Ok(())
}

fn report(ack: Ack) {
    match ack.deal_id {
        Some(id) => println!("{} (deal #{id})", ack.message),
        None => println!("{}", ack.message),
    }
}
