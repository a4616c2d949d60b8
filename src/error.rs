//! Error taxonomy for projection runs

use crate::policy::Gender;
use thiserror::Error;

/// Errors surfaced to the caller of a projection run.
///
/// Any of these aborts the run before a single row is produced.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// A required table column, marker row or setting is missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No rate or schedule entry for the requested key
    #[error("no {table} entry for age {age} ({gender:?})")]
    DataNotFound {
        table: &'static str,
        age: u8,
        gender: Gender,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("cannot parse {value:?} in {context}")]
    Parse { context: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
