use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("File loading failed: {0}")]
    Load(#[from] salesboard_loader::LoadError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required column '{0}' is missing from the export")]
    MissingColumn(&'static str),

    #[error("No entries selected")]
    EmptySelection,

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
