//! # Print Error Types
//!
//! Failures of the printing paths. The sale flow logs them and moves on;
//! only the printer test in settings reports them to the user.

use thiserror::Error;

/// Printing errors.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The print helper could not be reached (refused, timeout, DNS).
    #[error("Print helper unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The print helper answered with a non-success status.
    #[error("Print helper at {url} answered with status {status}")]
    Rejected { url: String, status: u16 },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Writing a downloaded receipt failed.
    #[error("Could not write receipt file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for printing operations.
pub type PrintResult<T> = Result<T, PrintError>;
