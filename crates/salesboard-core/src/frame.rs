use polars::prelude::*;

use crate::error::{ReportError, Result};

pub(crate) fn utf8_column<'a>(df: &'a DataFrame, name: &'static str) -> Result<&'a StringChunked> {
    df.column(name)
        .map_err(|_| ReportError::MissingColumn(name))?
        .str()
        .map_err(ReportError::from)
}

pub(crate) fn date_column(df: &DataFrame) -> Result<&DateChunked> {
    df.column("inquiry_date")
        .map_err(|_| ReportError::MissingColumn("inquiry_date"))?
        .date()
        .map_err(ReportError::from)
}

pub(crate) fn f64_column<'a>(df: &'a DataFrame, name: &'static str) -> Result<&'a Float64Chunked> {
    df.column(name)
        .map_err(|_| ReportError::MissingColumn(name))?
        .f64()
        .map_err(ReportError::from)
}
