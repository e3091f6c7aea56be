use polars::prelude::*;

use crate::error::{ReportError, Result};
use crate::types::{confirmation_rate, is_success_status, KpiSummary};
use salesboard_loader::SchemaCapabilities;

/// Replace the revenue and margin text columns with numeric ones. The export
/// writes amounts with thousands separators; anything unparseable or missing
/// counts as zero rather than failing the refresh.
pub fn coerce_money_columns(df: &mut DataFrame, caps: &SchemaCapabilities) -> Result<()> {
    if !caps.has_sales {
        return Ok(());
    }
    for name in ["revenue", "margin"] {
        let values = coerce_money_column(df, name)?;
        df.with_column(Series::new(name.into(), values))?;
    }
    Ok(())
}

fn coerce_money_column(df: &DataFrame, name: &'static str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| ReportError::MissingColumn(name))?;

    // Already numeric when a caller coerces twice.
    if let Ok(values) = column.f64() {
        return Ok(values.into_iter().map(|v| v.unwrap_or(0.0)).collect());
    }

    let text = column.str()?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(text.get(idx).map(parse_money).unwrap_or(0.0));
    }
    Ok(values)
}

/// "1,234,500" -> 1234500.0; unparseable input -> 0.
pub fn parse_money(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|ch| *ch != ',').collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Per-row success flags from the status column.
pub fn success_mask(df: &DataFrame) -> Result<BooleanChunked> {
    let status = df
        .column("status")
        .map_err(|_| ReportError::MissingColumn("status"))?
        .str()?;
    let mut mask = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        mask.push(status.get(idx).map(is_success_status).unwrap_or(false));
    }
    Ok(BooleanChunked::from_slice("is_success".into(), &mask))
}

/// Headline numbers for the filtered table. Without a status column the
/// success count is zero, matching how the report treats the column as an
/// optional feature.
pub fn kpi_summary(df: &DataFrame, caps: &SchemaCapabilities) -> Result<KpiSummary> {
    let total = df.height();
    let success = if caps.has_status {
        success_mask(df)?
            .into_iter()
            .filter(|flag| *flag == Some(true))
            .count()
    } else {
        0
    };

    Ok(KpiSummary {
        total_inquiries: total,
        successful_inquiries: success,
        confirmation_rate: confirmation_rate(success, total),
    })
}
