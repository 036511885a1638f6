//! Divvy command-line driver.
//!
//! Splits a single expense, or reads group snapshot files and prints
//! balances and suggested settlements as JSON on stdout. Logs go to stderr.

mod snapshot;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use divvy_core::balance::{BalanceAggregator, NetBalances, OverallSummary, PeerBalance};
use divvy_core::ledger::{GroupSnapshot, OwedShare};
use divvy_core::settlement::{DebtSimplifier, SimplifiedPayment};
use divvy_core::split::{SplitCalculator, SplitParticipant, SplitPolicy};
use divvy_shared::AppConfig;
use divvy_shared::config::LoggingConfig;
use divvy_shared::types::{Currency, GroupId, Money, UserId};

use snapshot::{SnapshotFile, load_ledger};

#[derive(Parser, Debug)]
#[command(name = "divvy", version, about = "Shared expense splitting and settlement")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split an expense total among participants.
    Split {
        /// Expense total.
        #[arg(short, long)]
        total: Decimal,

        /// Currency code; defaults to `settlement.default_currency`.
        #[arg(short, long)]
        currency: Option<Currency>,

        /// EQUAL, EXACT, PERCENTAGE or SHARE.
        #[arg(long, default_value = "EQUAL")]
        policy: SplitPolicy,

        /// Participant as `<uuid>` or `<uuid>=<value>`. Repeatable.
        #[arg(short, long = "participant", required = true, value_parser = parse_participant)]
        participants: Vec<SplitParticipant>,
    },

    /// Show an observer's balances across one or more groups.
    Balances {
        /// Group snapshot file. Repeatable.
        #[arg(short, long = "snapshot", required = true)]
        snapshots: Vec<PathBuf>,

        /// Participant whose balances are shown.
        #[arg(short, long)]
        observer: UserId,
    },

    /// Suggest payments that settle a group.
    Simplify {
        /// Group snapshot file.
        #[arg(short, long)]
        snapshot: PathBuf,
    },
}

#[derive(Serialize)]
struct GroupBalances {
    group_id: GroupId,
    balances: Vec<PeerBalance>,
}

#[derive(Serialize)]
struct BalancesReport {
    groups: Vec<GroupBalances>,
    summary: OverallSummary,
}

#[derive(Serialize)]
struct SettlementReport {
    group_id: GroupId,
    net_balances: NetBalances,
    payments: Vec<SimplifiedPayment>,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let cli = Cli::parse();
    let default_currency = config.settlement.default_currency;

    match cli.command {
        Commands::Split {
            total,
            currency,
            policy,
            participants,
        } => {
            let total = Money::new(total, currency.unwrap_or(default_currency));
            info!(%total, %policy, participants = participants.len(), "splitting expense");

            let owed: Vec<OwedShare> =
                SplitCalculator::compute_split(total, policy, &participants)?;
            print_json(&owed)?;
        }

        Commands::Balances {
            snapshots,
            observer,
        } => {
            let files = snapshots
                .iter()
                .map(|path| SnapshotFile::read(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let pinned: Vec<(GroupId, Option<Currency>)> =
                files.iter().map(|f| (f.group_id, f.currency)).collect();
            let ledger = load_ledger(files)?;

            let mut groups = Vec::with_capacity(pinned.len());
            for (group_id, currency) in pinned {
                let snapshot = GroupSnapshot::load(
                    &ledger,
                    group_id,
                    currency.unwrap_or(default_currency),
                )?;
                groups.push(GroupBalances {
                    group_id,
                    balances: BalanceAggregator::group_balances(&snapshot, observer),
                });
            }
            let summary = BalanceAggregator::overall_summary(&ledger, observer, default_currency)?;

            print_json(&BalancesReport { groups, summary })?;
        }

        Commands::Simplify { snapshot } => {
            let file = SnapshotFile::read(&snapshot)?;
            let group_id = file.group_id;
            let currency = file.currency.unwrap_or(default_currency);
            let ledger = load_ledger(vec![file])?;

            let snapshot = GroupSnapshot::load(&ledger, group_id, currency)?;
            let net_balances = BalanceAggregator::group_net_balances(&snapshot);
            let payments = DebtSimplifier::simplify(&net_balances)?;

            print_json(&SettlementReport {
                group_id,
                net_balances,
                payments,
            })?;
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses `<uuid>` or `<uuid>=<value>`.
fn parse_participant(raw: &str) -> Result<SplitParticipant, String> {
    let (id, value) = match raw.split_once('=') {
        Some((id, value)) => (id, Some(value)),
        None => (raw, None),
    };

    let user_id: UserId = id
        .trim()
        .parse()
        .map_err(|err| format!("invalid participant id {id:?}: {err}"))?;

    match value {
        Some(value) => {
            let value: Decimal = value
                .trim()
                .parse()
                .map_err(|err| format!("invalid value {value:?} for {user_id}: {err}"))?;
            Ok(SplitParticipant::with_value(user_id, value))
        }
        None => Ok(SplitParticipant::equal(user_id)),
    }
}
