use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use polars::prelude::*;
use tracing::{info, warn};

use crate::decode::decode_export;
use crate::errors::LoadError;
use crate::model::{InquiryColumn, InquiryTable, SchemaCapabilities};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_LABEL_FORMAT: &str = "%Y-%m";

/// Load an inquiry export into a DataFrame with canonical column names.
///
/// The file is decoded CP949-first with a UTF-8 fallback, headers are mapped
/// through [`InquiryColumn`], and the inquiry-date column (when present) is
/// parsed into a Date column with a derived `inquiry_month` label. Rows whose
/// date does not parse keep a null date rather than failing the load.
pub fn load_inquiry_file(path: impl AsRef<Path>) -> Result<InquiryTable, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let modified_at = fs::metadata(path)
        .ok()
        .and_then(|meta| meta.modified().ok())
        .map(DateTime::<Utc>::from);

    let content = decode_export(&bytes)?;
    let (df, capabilities) = parse_export(&content)?;

    info!(
        path = %path.display(),
        rows = df.height(),
        "loaded inquiry export"
    );

    Ok(InquiryTable {
        df,
        capabilities,
        source_path: path.to_path_buf(),
        modified_at,
    })
}

fn parse_export(content: &str) -> Result<(DataFrame, SchemaCapabilities), LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();

    // Map each header position to a canonical column; the first occurrence of
    // a column wins and later duplicates are ignored.
    let mut roles: Vec<Option<InquiryColumn>> = Vec::with_capacity(headers.len());
    let mut seen: Vec<InquiryColumn> = Vec::new();
    for header in headers.iter() {
        let role = InquiryColumn::from_header(header).filter(|column| !seen.contains(column));
        if let Some(column) = role {
            seen.push(column);
        }
        roles.push(role);
    }

    if seen.is_empty() {
        return Err(LoadError::InvalidHeader {
            message: "no recognized inquiry columns in the header row".to_string(),
        });
    }

    let mut text_columns: HashMap<InquiryColumn, Vec<Option<String>>> =
        seen.iter().map(|column| (*column, Vec::new())).collect();

    for record in reader.records() {
        let record = record?;
        for (position, role) in roles.iter().enumerate() {
            let Some(column) = role else { continue };
            let value = record
                .get(position)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            text_columns
                .get_mut(column)
                .expect("accumulated column missing")
                .push(value);
        }
    }

    let row_count = text_columns
        .values()
        .next()
        .map(|values| values.len())
        .unwrap_or(0);

    let mut columns: Vec<Column> = Vec::with_capacity(seen.len() + 1);
    for column in &seen {
        let values = text_columns
            .remove(column)
            .expect("accumulated column missing");
        if values.len() != row_count {
            return Err(LoadError::Validation {
                message: format!(
                    "column '{}' had {} rows, expected {row_count}",
                    column.canonical_name(),
                    values.len()
                ),
            });
        }

        if *column == InquiryColumn::InquiryDate {
            let (days, labels) = parse_date_column(&values);
            let date_series = Series::new("inquiry_date".into(), days)
                .cast(&DataType::Date)
                .map_err(|err| LoadError::Validation {
                    message: format!("failed to cast inquiry_date column: {err}"),
                })?;
            columns.push(date_series.into());
            columns.push(Series::new("inquiry_month".into(), labels).into());
        } else {
            let utf8: Vec<Option<&str>> = values.iter().map(|value| value.as_deref()).collect();
            columns.push(Series::new(column.canonical_name().into(), utf8).into());
        }
    }

    let df = DataFrame::new(columns).map_err(|err| LoadError::Validation {
        message: format!("failed to build inquiry dataframe: {err}"),
    })?;

    Ok((df, SchemaCapabilities::from_columns(&seen)))
}

fn parse_date_column(values: &[Option<String>]) -> (Vec<Option<i32>>, Vec<Option<String>>) {
    let epoch = unix_epoch();
    let mut days = Vec::with_capacity(values.len());
    let mut labels = Vec::with_capacity(values.len());
    let mut coerced = 0usize;

    for value in values {
        let parsed = value
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok());
        if value.is_some() && parsed.is_none() {
            coerced += 1;
        }
        days.push(parsed.map(|date| (date - epoch).num_days() as i32));
        labels.push(parsed.map(|date| date.format(MONTH_LABEL_FORMAT).to_string()));
    }

    if coerced > 0 {
        warn!(rows = coerced, "unparseable inquiry dates coerced to null");
    }

    (days, labels)
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
}
