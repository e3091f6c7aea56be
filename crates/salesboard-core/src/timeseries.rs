use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use polars::prelude::*;

use crate::derive::success_mask;
use crate::error::Result;
use crate::frame::date_column;
use crate::types::{confirmation_rate, date_from_days, days_from_date, Granularity};
use salesboard_loader::SchemaCapabilities;

/// Where the per-bucket success annotation should be drawn. Short bars get
/// the label above them so it stays legible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPosition {
    Inside,
    Outside,
}

impl LabelPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelPosition::Inside => "inside",
            LabelPosition::Outside => "outside",
        }
    }

    /// Baseline readability rule: below 30% of the bucket total, or below an
    /// absolute floor of five, the label moves outside the bar.
    pub fn for_counts(success: usize, total: usize) -> LabelPosition {
        if (success as f64) < total as f64 * 0.3 || success < 5 {
            LabelPosition::Outside
        } else {
            LabelPosition::Inside
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct BucketAccum {
    total: usize,
    success: usize,
}

/// Roll the filtered table up into time buckets.
///
/// Rows without an inquiry date are excluded here only. Monthly output is
/// densified over the observed span so charts show zero bars instead of
/// missing months; weekly output contains only weeks that occur.
pub fn trend_stats(
    df: &DataFrame,
    caps: &SchemaCapabilities,
    granularity: Granularity,
) -> Result<DataFrame> {
    let dates = date_column(df)?;
    let success = if caps.has_status {
        Some(success_mask(df)?)
    } else {
        None
    };

    let mut buckets: BTreeMap<NaiveDate, BucketAccum> = BTreeMap::new();
    for idx in 0..df.height() {
        let Some(date) = dates.get(idx).map(date_from_days) else {
            continue;
        };
        let bucket = match granularity {
            Granularity::Weekly => week_start(date),
            Granularity::Monthly => month_start(date),
        };
        let entry = buckets.entry(bucket).or_default();
        entry.total += 1;
        if success
            .as_ref()
            .and_then(|mask| mask.get(idx))
            .unwrap_or(false)
        {
            entry.success += 1;
        }
    }

    if granularity == Granularity::Monthly {
        densify_months(&mut buckets);
    }

    let mut bucket_days = Vec::with_capacity(buckets.len());
    let mut labels = Vec::with_capacity(buckets.len());
    let mut totals: Vec<u32> = Vec::with_capacity(buckets.len());
    let mut successes: Vec<u32> = Vec::with_capacity(buckets.len());
    let mut rates = Vec::with_capacity(buckets.len());
    let mut positions = Vec::with_capacity(buckets.len());

    for (bucket, accum) in &buckets {
        bucket_days.push(days_from_date(*bucket));
        labels.push(match granularity {
            Granularity::Weekly => bucket.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => bucket.format("%Y-%m").to_string(),
        });
        totals.push(accum.total as u32);
        successes.push(accum.success as u32);
        rates.push(confirmation_rate(accum.success, accum.total));
        positions.push(LabelPosition::for_counts(accum.success, accum.total).as_str());
    }

    let bucket_series = Series::new("bucket".into(), bucket_days).cast(&DataType::Date)?;

    Ok(DataFrame::new(vec![
        bucket_series.into(),
        Series::new("period_label".into(), labels).into(),
        Series::new("total".into(), totals).into(),
        Series::new("success".into(), successes).into(),
        Series::new("confirmation_rate".into(), rates).into(),
        Series::new("success_label_position".into(), positions).into(),
    ])?)
}

/// The Monday on or before the given date.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The first day of the date's calendar month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("first of month is valid")
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is valid")
}

fn densify_months(buckets: &mut BTreeMap<NaiveDate, BucketAccum>) {
    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return;
    };

    let mut month = first;
    while month <= last {
        buckets.entry(month).or_default();
        month = next_month(month);
    }
}
