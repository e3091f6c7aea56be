pub mod channels;
pub mod derive;
pub mod error;
pub mod filters;
mod frame;
pub mod owners;
pub mod selection;
pub mod status;
pub mod timeseries;
pub mod types;

pub use error::{ReportError, Result};
pub use salesboard_loader::{InquiryTable, SchemaCapabilities};
