use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Status labels that count as a won inquiry (confirmed / completed), exactly
/// as the source system emits them.
pub const SUCCESS_STATUSES: [&str; 2] = ["확정", "진행 완료"];

/// Longest explicit date range that still renders weekly buckets, in days.
pub const WEEKLY_SPAN_MAX_DAYS: i64 = 56;

pub fn is_success_status(status: &str) -> bool {
    let trimmed = status.trim();
    SUCCESS_STATUSES
        .iter()
        .any(|candidate| *candidate == trimmed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupBy {
    Owner,
    Team,
}

impl GroupBy {
    /// Column name the grouped stats table is keyed by.
    pub fn key_column(&self) -> &'static str {
        match self {
            GroupBy::Owner => "owner",
            GroupBy::Team => "team",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_column())
    }
}

impl TryFrom<&str> for GroupBy {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(GroupBy::Owner),
            "team" => Ok(GroupBy::Team),
            other => Err(format!("unknown grouping key '{other}'")),
        }
    }
}

/// The three headline numbers of the overview report.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KpiSummary {
    pub total_inquiries: usize,
    pub successful_inquiries: usize,
    pub confirmation_rate: f64,
}

/// Every rate in the report is shown with one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// successes/total as a percentage; 0 for an empty group, never NaN.
pub fn confirmation_rate(success: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(success as f64 / total as f64 * 100.0)
    }
}

/// margin/revenue as a percentage; 0 when there was no revenue.
pub fn margin_rate(margin: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        0.0
    } else {
        round1(margin / revenue * 100.0)
    }
}

/// Date columns store days since the Unix epoch.
pub fn date_from_days(days: i32) -> NaiveDate {
    unix_epoch() + Duration::days(days as i64)
}

pub fn days_from_date(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
}
