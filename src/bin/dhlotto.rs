//! Command-line client
//!
//! Runs a single operation against the operator and prints the result as
//! JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! dhlotto balance
//! dhlotto round --round 1122
//! dhlotto history --days 30
//! dhlotto buy --auto 2 --manual "3,9,15,27,34,41" --max-games 3
//! dhlotto pension round
//! dhlotto pension buy --count 2
//! ```
//!
//! Credentials come from the config file or `DHLOTTERY_USERNAME` /
//! `DHLOTTERY_PASSWORD`.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dhlottery::{
    AccountService, DrawInfoService, PurchaseEngine, SessionManager, Settings,
    config::{ConfigLoader, default_config_path},
    types::{Credentials, DateRange, ProductCode, PurchaseSlot},
    utils::{Clock, KstClock, get_version},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "dhlotto")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the account balance
    Balance,
    /// Show the winning numbers of a round
    Round {
        /// Round number (latest when omitted)
        #[arg(short, long)]
        round: Option<u32>,
    },
    /// Show the Lotto 6/45 purchase ledger
    History {
        /// Number of days to look back
        #[arg(short, long, default_value_t = 7)]
        days: i64,
    },
    /// Show this week's tickets with their numbers
    Tickets,
    /// Buy Lotto 6/45 tickets for the next round
    Buy {
        /// Number of automatic games
        #[arg(long, default_value_t = 0)]
        auto: usize,
        /// Manual game as comma-separated numbers (repeatable)
        #[arg(long, value_name = "NUMBERS")]
        manual: Vec<String>,
        /// Buy at most this many games
        #[arg(long)]
        max_games: Option<usize>,
    },
    /// Pension Lottery 720+
    Pension {
        #[command(subcommand)]
        command: PensionCommand,
    },
}

#[derive(Subcommand)]
enum PensionCommand {
    /// Show the first-prize number of a round
    Round {
        /// Round number (latest when omitted)
        #[arg(short, long)]
        round: Option<u32>,
    },
    /// Show this week's pension tickets
    Tickets,
    /// Buy machine-picked tickets for the next round
    Buy {
        /// Number of tickets
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let settings = match ConfigLoader::new().load(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let default_level = if cli.verbose || settings.logging.verbose {
        "debug".to_string()
    } else {
        settings.logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!("dhlotto v{} using config {:?}", get_version(), config_path);

    match run(cli.command, settings).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(command: Command, settings: Settings) -> anyhow::Result<String> {
    match command {
        Command::Round { round } => {
            let session = Arc::new(SessionManager::new(settings, Credentials::new("", "")));
            let record = DrawInfoService::new(session).get_round_info(round).await?;
            to_json(&record)
        }
        Command::Balance => {
            let session = connect(settings)?;
            let balance = AccountService::new(session.clone()).get_balance().await;
            session.close().await;
            to_json(&balance?)
        }
        Command::History { days } => {
            let session = connect(settings)?;
            let range = DateRange::last_days(KstClock.now().date(), days);
            let history = AccountService::new(session.clone())
                .get_purchase_history(ProductCode::Lotto645, range)
                .await;
            session.close().await;
            to_json(&history?)
        }
        Command::Tickets => {
            let session = connect(settings)?;
            let tickets = AccountService::new(session.clone())
                .get_recent_tickets()
                .await;
            session.close().await;
            to_json(&tickets?)
        }
        Command::Buy {
            auto,
            manual,
            max_games,
        } => {
            let slots = build_slots(auto, &manual)?;
            let session = connect(settings)?;
            let result = PurchaseEngine::new(session.clone())
                .buy(&slots, max_games)
                .await;
            session.close().await;
            to_json(&result?)
        }
        Command::Pension { command } => run_pension(command, settings).await,
    }
}

async fn run_pension(command: PensionCommand, settings: Settings) -> anyhow::Result<String> {
    match command {
        PensionCommand::Round { round } => {
            let session = Arc::new(SessionManager::new(settings, Credentials::new("", "")));
            let record = DrawInfoService::new(session)
                .get_pension_round_info(round)
                .await?;
            to_json(&record)
        }
        PensionCommand::Tickets => {
            let session = connect(settings)?;
            let tickets = AccountService::new(session.clone())
                .get_pension_tickets()
                .await;
            session.close().await;
            to_json(&tickets?)
        }
        PensionCommand::Buy { count } => {
            let session = connect(settings)?;
            let result = PurchaseEngine::new(session.clone()).buy_pension(count).await;
            session.close().await;
            to_json(&result?)
        }
    }
}

fn connect(settings: Settings) -> anyhow::Result<Arc<SessionManager>> {
    let session = SessionManager::from_settings(settings)
        .context("set DHLOTTERY_USERNAME and DHLOTTERY_PASSWORD or use a config file")?;
    Ok(Arc::new(session))
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Manual slots first, then automatic ones
fn build_slots(auto: usize, manual: &[String]) -> anyhow::Result<Vec<PurchaseSlot>> {
    let mut slots = manual
        .iter()
        .map(|numbers| parse_numbers(numbers).map(PurchaseSlot::manual))
        .collect::<anyhow::Result<Vec<_>>>()?;
    slots.extend(std::iter::repeat_n(PurchaseSlot::auto(), auto));

    if slots.is_empty() {
        bail!("nothing to buy: pass --auto N and/or --manual NUMBERS");
    }
    Ok(slots)
}

fn parse_numbers(input: &str) -> anyhow::Result<Vec<u8>> {
    input
        .split(',')
        .map(|n| {
            n.trim()
                .parse::<u8>()
                .with_context(|| format!("invalid number {:?} in {:?}", n.trim(), input))
        })
        .collect()
}
