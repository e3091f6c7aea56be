use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use salesboard_core::status::status_distribution;
use salesboard_core::types::round1;
use salesboard_core::ReportError;

use super::common::{self, FilterArgs};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let ctx = common::prepare(&args.filters)?;
    if ctx.filtered.height() == 0 {
        println!("\nNo rows matched the current filters.");
        return Ok(());
    }

    let stats = match status_distribution(&ctx.filtered, &ctx.table.capabilities) {
        Ok(stats) => stats,
        Err(ReportError::MissingColumn(_)) => {
            println!("\n⚠️  The export has no status column.");
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to aggregate the status distribution"),
    };

    println!("\n📋 Sales-status distribution");

    let names = stats.column("status")?.str()?;
    let counts = stats.column("count")?.u32()?;
    let total: u32 = counts.into_iter().flatten().sum();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Status", "Count", "Share (%)"]);
    for idx in 0..stats.height() {
        let count = counts.get(idx).unwrap_or(0);
        let share = if total == 0 {
            0.0
        } else {
            round1(count as f64 / total as f64 * 100.0)
        };
        table.add_row(vec![
            names.get(idx).unwrap_or("").to_string(),
            count.to_string(),
            format!("{share:.1}"),
        ]);
    }
    println!("{table}");

    Ok(())
}
