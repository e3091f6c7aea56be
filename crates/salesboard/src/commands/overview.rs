use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use salesboard_core::derive::kpi_summary;
use salesboard_core::timeseries::trend_stats;
use salesboard_core::types::Granularity;

use super::common::{self, FilterArgs};

#[derive(Args, Debug)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Emit the KPI summary as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: OverviewArgs) -> Result<()> {
    let ctx = common::prepare(&args.filters)?;
    let summary = kpi_summary(&ctx.filtered, &ctx.table.capabilities)
        .context("failed to compute the KPI summary")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\nTotal inquiries:       {}", summary.total_inquiries);
    println!("Confirmed & completed: {}", summary.successful_inquiries);
    println!("Confirmation rate:     {:.1}%", summary.confirmation_rate);

    if !ctx.table.capabilities.has_inquiry_date || ctx.filtered.height() == 0 {
        println!("\nNo dated rows to chart for this selection.");
        return Ok(());
    }

    let granularity = Granularity::for_filter(&ctx.spec.date);
    let stats = trend_stats(&ctx.filtered, &ctx.table.capabilities, granularity)
        .context("failed to aggregate the performance trend")?;

    println!("\n📊 Performance trend ({granularity})");

    let labels = stats.column("period_label")?.str()?;
    let totals = stats.column("total")?.u32()?;
    let successes = stats.column("success")?.u32()?;
    let rates = stats.column("confirmation_rate")?.f64()?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Period", "Inquiries", "Confirmed", "Rate (%)"]);
    for idx in 0..stats.height() {
        table.add_row(vec![
            labels.get(idx).unwrap_or("").to_string(),
            totals.get(idx).unwrap_or(0).to_string(),
            successes.get(idx).unwrap_or(0).to_string(),
            format!("{:.1}", rates.get(idx).unwrap_or(0.0)),
        ]);
    }
    println!("{table}");

    Ok(())
}
