use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::debug;

use crate::derive::success_mask;
use crate::error::{ReportError, Result};
use crate::frame::{f64_column, utf8_column};
use crate::selection::SelectionSet;
use crate::types::{confirmation_rate, margin_rate, GroupBy};
use salesboard_loader::SchemaCapabilities;

#[derive(Debug, Default, Clone, Copy)]
struct GroupAccum {
    count: usize,
    success: usize,
    revenue: f64,
    margin: f64,
}

/// Roll the filtered table up by owner or by team.
///
/// Owner grouping unpacks the comma-separated owner field: a row with N
/// owners contributes one sub-row per owner carrying 1/N of its revenue and
/// margin, so per-owner sums never double-count a shared deal. Rows with no
/// usable owner token drop out of owner grouping only; team grouping skips
/// rows without a team the same way.
///
/// Money columns must already be numeric (see
/// [`crate::derive::coerce_money_columns`]).
pub fn group_stats(df: &DataFrame, caps: &SchemaCapabilities, by: GroupBy) -> Result<DataFrame> {
    match by {
        GroupBy::Owner if !caps.has_owner => return Err(ReportError::MissingColumn("owner")),
        GroupBy::Team if !caps.has_team => return Err(ReportError::MissingColumn("team")),
        _ => {}
    }

    let success = if caps.has_status {
        Some(success_mask(df)?)
    } else {
        None
    };
    let revenue = if caps.has_sales {
        Some(f64_column(df, "revenue")?)
    } else {
        None
    };
    let margin = if caps.has_sales {
        Some(f64_column(df, "margin")?)
    } else {
        None
    };

    let row_success =
        |idx: usize| -> bool { success.as_ref().and_then(|m| m.get(idx)).unwrap_or(false) };
    let row_value = |column: &Option<&Float64Chunked>, idx: usize| -> f64 {
        column.as_ref().and_then(|c| c.get(idx)).unwrap_or(0.0)
    };

    let mut groups: BTreeMap<String, GroupAccum> = BTreeMap::new();

    match by {
        GroupBy::Owner => {
            let owners = utf8_column(df, "owner")?;
            for idx in 0..df.height() {
                let raw = owners.get(idx).unwrap_or("");
                let tokens: Vec<&str> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .collect();
                if tokens.is_empty() {
                    continue;
                }

                let share = tokens.len() as f64;
                let is_success = row_success(idx);
                let row_revenue = row_value(&revenue, idx) / share;
                let row_margin = row_value(&margin, idx) / share;

                for token in tokens {
                    let entry = groups.entry(token.to_string()).or_default();
                    entry.count += 1;
                    if is_success {
                        entry.success += 1;
                    }
                    entry.revenue += row_revenue;
                    entry.margin += row_margin;
                }
            }
        }
        GroupBy::Team => {
            let teams = utf8_column(df, "team")?;
            for idx in 0..df.height() {
                let Some(team) = teams.get(idx).map(str::trim).filter(|t| !t.is_empty()) else {
                    continue;
                };
                let entry = groups.entry(team.to_string()).or_default();
                entry.count += 1;
                if row_success(idx) {
                    entry.success += 1;
                }
                entry.revenue += row_value(&revenue, idx);
                entry.margin += row_value(&margin, idx);
            }
        }
    }

    debug!(groups = groups.len(), key = %by, "aggregated group stats");

    let mut names = Vec::with_capacity(groups.len());
    let mut counts: Vec<u32> = Vec::with_capacity(groups.len());
    let mut successes: Vec<u32> = Vec::with_capacity(groups.len());
    let mut rates = Vec::with_capacity(groups.len());
    let mut revenues = Vec::with_capacity(groups.len());
    let mut margins = Vec::with_capacity(groups.len());
    let mut margin_rates = Vec::with_capacity(groups.len());

    for (name, accum) in &groups {
        names.push(name.clone());
        counts.push(accum.count as u32);
        successes.push(accum.success as u32);
        rates.push(confirmation_rate(accum.success, accum.count));
        revenues.push(accum.revenue);
        margins.push(accum.margin);
        margin_rates.push(margin_rate(accum.margin, accum.revenue));
    }

    let mut columns: Vec<Column> = vec![
        Series::new(by.key_column().into(), names).into(),
        Series::new("inquiry_count".into(), counts).into(),
        Series::new("success_count".into(), successes).into(),
        Series::new("confirmation_rate".into(), rates).into(),
    ];
    if caps.has_sales {
        columns.push(Series::new("revenue_sum".into(), revenues).into());
        columns.push(Series::new("margin_sum".into(), margins).into());
        columns.push(Series::new("margin_rate".into(), margin_rates).into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Keep only the groups the caller has selected. An empty selection is an
/// error so the presentation layer can warn instead of rendering an empty
/// chart.
pub fn apply_selection(
    stats: &DataFrame,
    by: GroupBy,
    selection: &SelectionSet,
) -> Result<DataFrame> {
    if selection.is_empty() {
        return Err(ReportError::EmptySelection);
    }

    let names = utf8_column(stats, by.key_column())?;
    let mut mask = Vec::with_capacity(stats.height());
    for idx in 0..stats.height() {
        mask.push(
            names
                .get(idx)
                .map(|name| selection.contains(name))
                .unwrap_or(false),
        );
    }
    Ok(stats.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}
