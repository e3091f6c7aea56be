use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use polars::prelude::DataFrame;
use tracing::info;

use salesboard_core::derive::coerce_money_columns;
use salesboard_core::filters::{apply_filter_spec, DateFilter, FilterSpec};
use salesboard_loader::{load_inquiry_file, InquiryTable, LoadError};

const DEFAULT_DATA_FILE: &str = "data.csv";
const DATA_FILE_ENV: &str = "SALESBOARD_DATA_FILE";

/// Flags shared by every report view.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Inquiry export to read (default: $SALESBOARD_DATA_FILE, then data.csv)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Start of an explicit date range (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "to", conflicts_with_all = ["year", "month"])]
    pub from: Option<NaiveDate>,

    /// End of an explicit date range (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Restrict to a single calendar year
    #[arg(long, conflicts_with = "month")]
    pub year: Option<i32>,

    /// Restrict to a single month, as YYYY-MM
    #[arg(long)]
    pub month: Option<String>,

    /// Exact team name
    #[arg(long)]
    pub team: Option<String>,

    /// Owner name (matched anywhere inside the comma-packed owner field)
    #[arg(long)]
    pub owner: Option<String>,
}

impl FilterArgs {
    pub fn filter_spec(&self) -> Result<FilterSpec> {
        Ok(FilterSpec {
            date: self.date_filter()?,
            team: self.team.clone(),
            owner: self.owner.clone(),
        })
    }

    fn date_filter(&self) -> Result<DateFilter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                bail!("--to must not precede --from");
            }
            return Ok(DateFilter::Range {
                start: from,
                end: to,
            });
        }
        if let Some(month) = self.month.as_deref() {
            return parse_year_month(month);
        }
        if let Some(year) = self.year {
            return Ok(DateFilter::Year(year));
        }
        Ok(DateFilter::AllTime)
    }
}

fn parse_year_month(raw: &str) -> Result<DateFilter> {
    let parsed = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .with_context(|| format!("--month must look like YYYY-MM, got '{raw}'"))?;
    Ok(DateFilter::Month {
        year: parsed.year(),
        month: parsed.month(),
    })
}

/// Everything a report view works from: the loaded table, the rows that
/// survived the filters, and the spec that produced them.
pub struct ReportContext {
    pub table: InquiryTable,
    pub filtered: DataFrame,
    pub spec: FilterSpec,
}

pub fn resolve_data_file(file: &Option<PathBuf>) -> PathBuf {
    file.clone()
        .or_else(|| std::env::var(DATA_FILE_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Load the export, coerce the money columns, and apply the shared filters.
///
/// A missing data file is the one failure a report user is expected to fix
/// themselves, so it prints guidance instead of an error chain.
pub fn prepare(args: &FilterArgs) -> Result<ReportContext> {
    let path = resolve_data_file(&args.file);

    let mut table = match load_inquiry_file(&path) {
        Ok(table) => table,
        Err(LoadError::MissingFile { path }) => {
            println!("⚠️  Data file not found: {}", path.display());
            println!(
                "Drop the CRM CSV export at '{}' (or point SALESBOARD_DATA_FILE at it) and run again.",
                path.display()
            );
            std::process::exit(1);
        }
        Err(err) => return Err(err).context("failed to load the inquiry export"),
    };

    if let Some(modified) = table.modified_at {
        println!(
            "📅 Data last updated: {}",
            modified.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    coerce_money_columns(&mut table.df, &table.capabilities)
        .context("failed to coerce money columns")?;

    let spec = args.filter_spec()?;
    let filtered = apply_filter_spec(&table.df, &table.capabilities, &spec)
        .context("failed to apply filters")?;

    info!(
        rows = filtered.height(),
        total = table.df.height(),
        "prepared report context"
    );

    Ok(ReportContext {
        table,
        filtered,
        spec,
    })
}
