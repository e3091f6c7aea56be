use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct DecodeAttempt {
    pub encoding: &'static str,
    pub message: String,
}

impl DecodeAttempt {
    pub fn new(encoding: &'static str, message: impl Into<String>) -> Self {
        Self {
            encoding,
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.encoding, self.message)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file '{path}' does not exist")]
    MissingFile { path: PathBuf },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no encoding decoded the file; attempts: {attempts:?}")]
    Decode { attempts: Vec<DecodeAttempt> },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("header row invalid: {message}")]
    InvalidHeader { message: String },

    #[error("validation error: {message}")]
    Validation { message: String },
}
