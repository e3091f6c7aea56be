use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::{ReportError, Result};
use crate::frame::utf8_column;
use salesboard_loader::SchemaCapabilities;

/// Frequency distribution of the raw status field, most frequent first
/// (ties by name).
pub fn status_distribution(df: &DataFrame, caps: &SchemaCapabilities) -> Result<DataFrame> {
    if !caps.has_status {
        return Err(ReportError::MissingColumn("status"));
    }

    let status = utf8_column(df, "status")?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for idx in 0..df.height() {
        let Some(value) = status.get(idx) else {
            continue;
        };
        *counts.entry(value.to_string()).or_default() += 1;
    }

    let mut rows: Vec<(String, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut names = Vec::with_capacity(rows.len());
    let mut totals: Vec<u32> = Vec::with_capacity(rows.len());
    for (name, count) in &rows {
        names.push(name.clone());
        totals.push(*count as u32);
    }

    Ok(DataFrame::new(vec![
        Series::new("status".into(), names).into(),
        Series::new("count".into(), totals).into(),
    ])?)
}
