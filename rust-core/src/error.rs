//! Error types for the fallible edges of the engine.
//!
//! The detector itself never fails. Errors only arise while loading or
//! validating configuration and while reading recorded sample logs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),

    #[error("sensitivity {0} is outside 0..={max}", max = crate::config::Sensitivity::MAX)]
    SensitivityOutOfRange(u32),

    #[error("invalid `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// A recorded sample log could not be replayed.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("opening {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sample record: {0}")]
    Record(#[from] csv::Error),

    #[error("sample at line {line} goes back in time ({timestamp_ms} ms after {previous_ms} ms)")]
    OutOfOrder {
        line: u64,
        timestamp_ms: u64,
        previous_ms: u64,
    },
}
