use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::frame::{date_column, utf8_column};
use crate::types::{date_from_days, Granularity, WEEKLY_SPAN_MAX_DAYS};
use salesboard_loader::SchemaCapabilities;

/// Temporal narrowing modes. Exactly one is active per refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    AllTime,
    /// Inclusive on both ends.
    Range { start: NaiveDate, end: NaiveDate },
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Default for DateFilter {
    fn default() -> Self {
        DateFilter::AllTime
    }
}

/// One refresh worth of narrowing. Owner matching runs against the raw
/// comma-packed field as a substring, so a short query can also hit other
/// owners containing it.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub date: DateFilter,
    pub team: Option<String>,
    pub owner: Option<String>,
}

impl Granularity {
    /// Weekly buckets only for explicit ranges spanning at most eight weeks.
    pub fn for_filter(filter: &DateFilter) -> Granularity {
        match filter {
            DateFilter::Range { start, end }
                if (*end - *start).num_days() <= WEEKLY_SPAN_MAX_DAYS =>
            {
                Granularity::Weekly
            }
            _ => Granularity::Monthly,
        }
    }
}

/// Narrow the working table. Filters whose column is absent from the export
/// are skipped; the column-presence flags come from the loader.
pub fn apply_filter_spec(
    df: &DataFrame,
    caps: &SchemaCapabilities,
    spec: &FilterSpec,
) -> Result<DataFrame> {
    let mut filtered = df.clone();

    if caps.has_inquiry_date {
        filtered = apply_date_filter(&filtered, &spec.date)?;
    }
    if caps.has_team {
        if let Some(team) = spec.team.as_deref() {
            filtered = filter_by_team(&filtered, team)?;
        }
    }
    if caps.has_owner {
        if let Some(owner) = spec.owner.as_deref() {
            filtered = filter_by_owner(&filtered, owner)?;
        }
    }

    debug!(
        rows_in = df.height(),
        rows_out = filtered.height(),
        "applied filter spec"
    );

    Ok(filtered)
}

fn apply_date_filter(df: &DataFrame, filter: &DateFilter) -> Result<DataFrame> {
    if matches!(filter, DateFilter::AllTime) {
        return Ok(df.clone());
    }

    let dates = date_column(df)?;
    let mut mask = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let keep = match dates.get(idx).map(date_from_days) {
            None => false,
            Some(date) => match filter {
                DateFilter::AllTime => true,
                DateFilter::Range { start, end } => date >= *start && date <= *end,
                DateFilter::Year(year) => date.year() == *year,
                DateFilter::Month { year, month } => {
                    date.year() == *year && date.month() == *month
                }
            },
        };
        mask.push(keep);
    }

    Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}

fn filter_by_team(df: &DataFrame, team: &str) -> Result<DataFrame> {
    let teams = utf8_column(df, "team")?;
    let mut mask = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        mask.push(teams.get(idx) == Some(team));
    }
    Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}

fn filter_by_owner(df: &DataFrame, owner: &str) -> Result<DataFrame> {
    let owners = utf8_column(df, "owner")?;
    let mut mask = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        mask.push(
            owners
                .get(idx)
                .map(|raw| raw.contains(owner))
                .unwrap_or(false),
        );
    }
    Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}

/// Every distinct owner name, after unpacking the comma-separated field.
pub fn distinct_owner_tokens(df: &DataFrame) -> Result<Vec<String>> {
    let owners = utf8_column(df, "owner")?;
    let mut tokens = BTreeSet::new();
    for idx in 0..df.height() {
        let Some(raw) = owners.get(idx) else { continue };
        for token in raw.split(',') {
            let trimmed = token.trim();
            if !trimmed.is_empty() {
                tokens.insert(trimmed.to_string());
            }
        }
    }
    Ok(tokens.into_iter().collect())
}

/// Distinct team names, sorted.
pub fn distinct_teams(df: &DataFrame) -> Result<Vec<String>> {
    let teams = utf8_column(df, "team")?;
    let mut names = BTreeSet::new();
    for idx in 0..df.height() {
        if let Some(team) = teams.get(idx) {
            names.insert(team.to_string());
        }
    }
    Ok(names.into_iter().collect())
}

/// Earliest and latest non-null inquiry dates, if any.
pub fn observed_date_span(df: &DataFrame) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let dates = date_column(df)?;
    let mut span: Option<(NaiveDate, NaiveDate)> = None;
    for idx in 0..df.height() {
        let Some(date) = dates.get(idx).map(date_from_days) else {
            continue;
        };
        span = Some(match span {
            None => (date, date),
            Some((min, max)) => (min.min(date), max.max(date)),
        });
    }
    Ok(span)
}
