use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::channels::ChannelsArgs;
use commands::overview::OverviewArgs;
use commands::owners::OwnersArgs;
use commands::status::StatusArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly sales performance reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// KPI summary and the period-over-period performance trend
    Overview(OverviewArgs),
    /// Per-owner or per-team performance breakdown
    Owners(OwnersArgs),
    /// Inquiry-channel efficiency breakdown
    Channels(ChannelsArgs),
    /// Raw sales-status distribution
    Status(StatusArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Overview(args) => commands::overview::run(args),
        Command::Owners(args) => commands::owners::run(args),
        Command::Channels(args) => commands::channels::run(args),
        Command::Status(args) => commands::status::run(args),
    }
}
