//! Error types surfaced to callers
//!
//! Every variant's message is safe to show to an end user as-is.

use thiserror::Error;

/// Boxed error returned by the storage collaborator
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid Quizlet URL. Use a link like https://quizlet.com/123456789.")]
    InvalidUrl,

    #[error(
        "Quizlet blocked the import request (status {status}). Provide QUIZLET_COOKIE, \
         QUIZLET_CF_CLEARANCE or QUIZLET_IMPORT_PROXY to access Quizlet pages."
    )]
    Blocked { status: u16 },

    #[error("Quizlet request failed with status {status}.")]
    Http { status: u16 },

    #[error("Unable to parse this Quizlet set. Quizlet may have changed their page format.")]
    Unparsable,

    /// The wrapped error never carries the request URL, which may embed
    /// proxy credentials
    #[error("Network error while contacting Quizlet.")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Import was cancelled")]
    Cancelled,

    #[error("{integration} does not support {operation}")]
    Unsupported {
        integration: &'static str,
        operation: &'static str,
    },

    #[error("Failed to save the imported set: {0}")]
    Storage(#[source] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to read heuristics file {path}: {source}")]
    HeuristicsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed heuristics file {path}: {source}")]
    HeuristicsParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
