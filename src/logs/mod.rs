//! Bulk log download.
//!
//! # Data Flow
//! ```text
//! --start-time / --end-time
//!     → window.rs (format, ordering, duration, age)
//! --filename
//!     → download.rs (prepare_output_file)
//! service presigned URLs
//!     → download.rs (ensure_logs_available, download_logs)
//! ```

pub mod download;
pub mod window;

pub use download::{download_logs, ensure_logs_available, format_size, prepare_output_file};
pub use window::{validate_window, LogWindow};

use crate::service::ServiceError;

/// Errors of the bulk log download.
#[derive(Debug, thiserror::Error)]
pub enum LogDownloadError {
    #[error("{}", time_format_message(.flag, .suggestion))]
    InvalidTimeFormat {
        flag: &'static str,
        suggestion: Option<String>,
    },

    #[error("endTime must be later than startTime.")]
    EndBeforeStart,

    #[error(
        "Max duration between startTime and endTime should be 30 minutes. \
         Current duration is {hours} hours {minutes} minutes and {seconds} seconds."
    )]
    WindowTooLong { hours: i64, minutes: i64, seconds: i64 },

    #[error("Cannot get logs more than 30 days old. Adjust your time range.")]
    TooOld,

    #[error("Invalid file type. Provide a filename with a .csv extension: {0}")]
    InvalidFileExtension(String),

    #[error("Make sure the file: {0} is empty")]
    FileNotEmpty(String),

    #[error("No logs available to download")]
    NoLogs,

    #[error("Download timed out.")]
    TimedOut,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn time_format_message(flag: &str, suggestion: &Option<String>) -> String {
    match suggestion {
        Some(suggestion) => {
            format!("Use the format YYYY-MM-DDTHH:MM:SSZ for {flag}. Did you mean {suggestion}?")
        }
        None => format!("Use the format YYYY-MM-DDTHH:MM:SSZ for {flag}."),
    }
}
