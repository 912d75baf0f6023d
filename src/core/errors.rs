//! GDAY-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, GdayError>;

/// Top-level error type for gday.
#[derive(Debug, Error)]
pub enum GdayError {
    #[error("[GDAY-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[GDAY-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[GDAY-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[GDAY-2001] invalid time {input:?}: {reason}")]
    InvalidTime { input: String, reason: &'static str },

    #[error("[GDAY-2002] invalid appointment at {location}: {details}")]
    InvalidAppointment { location: String, details: String },

    #[error("[GDAY-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[GDAY-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GdayError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "GDAY-1001",
            Self::MissingConfig { .. } => "GDAY-1002",
            Self::ConfigParse { .. } => "GDAY-1003",
            Self::InvalidTime { .. } => "GDAY-2001",
            Self::InvalidAppointment { .. } => "GDAY-2002",
            Self::Serialization { .. } => "GDAY-2101",
            Self::Io { .. } => "GDAY-3002",
        }
    }

    /// Whether the failure is confined to one agenda entry.
    ///
    /// Input errors are reported and skipped; everything else aborts the command.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTime { .. } | Self::InvalidAppointment { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a malformed agenda entry.
    #[must_use]
    pub fn appointment(location: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidAppointment {
            location: location.into(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for GdayError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for GdayError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
