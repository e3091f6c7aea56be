use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use polars::prelude::DataFrame;

use salesboard_core::owners::{apply_selection, group_stats};
use salesboard_core::selection::{Roster, SelectionSet};
use salesboard_core::types::GroupBy;
use salesboard_core::ReportError;

use super::common::{self, FilterArgs};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GroupKeyArg {
    Owner,
    Team,
}

impl From<GroupKeyArg> for GroupBy {
    fn from(value: GroupKeyArg) -> Self {
        match value {
            GroupKeyArg::Owner => GroupBy::Owner,
            GroupKeyArg::Team => GroupBy::Team,
        }
    }
}

#[derive(Args, Debug)]
pub struct OwnersArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Grouping key for the breakdown
    #[arg(long, value_enum, default_value_t = GroupKeyArg::Owner)]
    pub by: GroupKeyArg,

    /// Keep only these names (repeatable); default keeps every group
    #[arg(long = "select", value_name = "NAME", conflicts_with_all = ["preset_active", "select_none"])]
    pub select: Vec<String>,

    /// Keep only the active-member roster
    #[arg(long, conflicts_with = "select_none")]
    pub preset_active: bool,

    /// Uncheck everything (prints the warning an empty chart would hide)
    #[arg(long)]
    pub select_none: bool,

    /// TOML roster file overriding the built-in active-member list
    #[arg(long, requires = "preset_active")]
    pub roster: Option<PathBuf>,
}

pub fn run(args: OwnersArgs) -> Result<()> {
    let ctx = common::prepare(&args.filters)?;
    if ctx.filtered.height() == 0 {
        println!("\nNo rows matched the current filters.");
        return Ok(());
    }

    let by = GroupBy::from(args.by);
    let stats = group_stats(&ctx.filtered, &ctx.table.capabilities, by)
        .context("failed to aggregate the breakdown")?;

    let entities: Vec<String> = stats
        .column(by.key_column())?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    let mut selection = SelectionSet::all_of(entities);
    if args.select_none {
        selection.select_none();
    } else if args.preset_active {
        let roster = match &args.roster {
            Some(path) => Roster::from_path(path).context("failed to load the roster file")?,
            None => Roster::default(),
        };
        selection.select_only(roster.active_members);
    } else if !args.select.is_empty() {
        selection.select_only(args.select.iter().cloned());
    }

    let visible = match apply_selection(&stats, by, &selection) {
        Ok(visible) => visible,
        Err(ReportError::EmptySelection) => {
            println!("\n⚠️  Select at least one entry to display.");
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to apply the selection"),
    };

    if visible.height() == 0 {
        println!("\nNone of the selected names appear in the current data.");
        return Ok(());
    }

    render(&visible, by, ctx.table.capabilities.has_sales)
}

fn render(stats: &DataFrame, by: GroupBy, has_sales: bool) -> Result<()> {
    let names = stats.column(by.key_column())?.str()?;
    let counts = stats.column("inquiry_count")?.u32()?;
    let successes = stats.column("success_count")?.u32()?;
    let rates = stats.column("confirmation_rate")?.f64()?;
    let revenue = if has_sales {
        Some(stats.column("revenue_sum")?.f64()?)
    } else {
        None
    };
    let margin = if has_sales {
        Some(stats.column("margin_sum")?.f64()?)
    } else {
        None
    };
    let margin_rates = if has_sales {
        Some(stats.column("margin_rate")?.f64()?)
    } else {
        None
    };

    // Revenue order when the export carries money columns, the way the sales
    // chart sorts; inquiry count otherwise.
    let sort_key = |idx: usize| -> f64 {
        match &revenue {
            Some(column) => column.get(idx).unwrap_or(0.0),
            None => counts.get(idx).unwrap_or(0) as f64,
        }
    };
    let mut order: Vec<usize> = (0..stats.height()).collect();
    order.sort_by(|a, b| {
        sort_key(*b)
            .partial_cmp(&sort_key(*a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    let mut header = vec!["Name", "Inquiries", "Confirmed", "Rate (%)"];
    if has_sales {
        header.extend(["Revenue", "Margin", "Margin (%)"]);
    }
    table.set_header(header);

    for idx in order {
        let mut row = vec![
            names.get(idx).unwrap_or("").to_string(),
            counts.get(idx).unwrap_or(0).to_string(),
            successes.get(idx).unwrap_or(0).to_string(),
            format!("{:.1}", rates.get(idx).unwrap_or(0.0)),
        ];
        if let (Some(revenue), Some(margin), Some(margin_rates)) =
            (&revenue, &margin, &margin_rates)
        {
            row.push(format!("{:.0}", revenue.get(idx).unwrap_or(0.0)));
            row.push(format!("{:.0}", margin.get(idx).unwrap_or(0.0)));
            row.push(format!("{:.1}", margin_rates.get(idx).unwrap_or(0.0)));
        }
        table.add_row(row);
    }
    println!("{table}");

    Ok(())
}
