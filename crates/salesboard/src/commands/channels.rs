use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use salesboard_core::channels::channel_stats;
use salesboard_core::ReportError;

use super::common::{self, FilterArgs};

#[derive(Args, Debug)]
pub struct ChannelsArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
}

pub fn run(args: ChannelsArgs) -> Result<()> {
    let ctx = common::prepare(&args.filters)?;
    if ctx.filtered.height() == 0 {
        println!("\nNo rows matched the current filters.");
        return Ok(());
    }

    let stats = match channel_stats(&ctx.filtered, &ctx.table.capabilities) {
        Ok(stats) => stats,
        Err(ReportError::MissingColumn(_)) => {
            println!("\n⚠️  The export has no inquiry-channel column.");
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to aggregate channels"),
    };

    println!("\n🚀 Inquiry-channel efficiency");

    let names = stats.column("channel")?.str()?;
    let counts = stats.column("inquiry_count")?.u32()?;
    let successes = stats.column("success_count")?.u32()?;
    let rates = stats.column("confirmation_rate")?.f64()?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Channel", "Inquiries", "Confirmed", "Rate (%)"]);
    for idx in 0..stats.height() {
        table.add_row(vec![
            names.get(idx).unwrap_or("").to_string(),
            counts.get(idx).unwrap_or(0).to_string(),
            successes.get(idx).unwrap_or(0).to_string(),
            format!("{:.1}", rates.get(idx).unwrap_or(0.0)),
        ]);
    }
    println!("{table}");

    Ok(())
}
