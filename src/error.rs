//! Error types for the file stores

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing LUT files
#[derive(Error, Debug)]
pub enum LutError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("no rows found in {0}")]
    Empty(PathBuf),

    #[error("could not create backup {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while reading or writing INI-style config files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}
