use std::collections::BTreeMap;

use polars::prelude::*;

use crate::derive::success_mask;
use crate::error::{ReportError, Result};
use crate::frame::utf8_column;
use crate::types::confirmation_rate;
use salesboard_loader::SchemaCapabilities;

#[derive(Debug, Default, Clone, Copy)]
struct ChannelAccum {
    count: usize,
    success: usize,
}

/// Per-channel efficiency rollup. Channels are single-valued, so no row
/// splitting happens; rows without a channel are skipped. Sorted by inquiry
/// count descending, ties by name.
pub fn channel_stats(df: &DataFrame, caps: &SchemaCapabilities) -> Result<DataFrame> {
    if !caps.has_channel {
        return Err(ReportError::MissingColumn("channel"));
    }

    let channels = utf8_column(df, "channel")?;
    let success = if caps.has_status {
        Some(success_mask(df)?)
    } else {
        None
    };

    let mut groups: BTreeMap<String, ChannelAccum> = BTreeMap::new();
    for idx in 0..df.height() {
        let Some(channel) = channels.get(idx) else {
            continue;
        };
        let entry = groups.entry(channel.to_string()).or_default();
        entry.count += 1;
        if success
            .as_ref()
            .and_then(|mask| mask.get(idx))
            .unwrap_or(false)
        {
            entry.success += 1;
        }
    }

    let mut rows: Vec<(String, ChannelAccum)> = groups.into_iter().collect();
    rows.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0)));

    let mut names = Vec::with_capacity(rows.len());
    let mut counts: Vec<u32> = Vec::with_capacity(rows.len());
    let mut successes: Vec<u32> = Vec::with_capacity(rows.len());
    let mut rates = Vec::with_capacity(rows.len());
    for (name, accum) in &rows {
        names.push(name.clone());
        counts.push(accum.count as u32);
        successes.push(accum.success as u32);
        rates.push(confirmation_rate(accum.success, accum.count));
    }

    Ok(DataFrame::new(vec![
        Series::new("channel".into(), names).into(),
        Series::new("inquiry_count".into(), counts).into(),
        Series::new("success_count".into(), successes).into(),
        Series::new("confirmation_rate".into(), rates).into(),
    ])?)
}
