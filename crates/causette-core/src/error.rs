//! Error types for the Causette client core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Causette crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Note that the store and
/// dispatch surfaces are intentionally infallible (they degrade instead of
/// failing); this type covers the configuration and path layers.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CausetteError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CausetteError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for CausetteError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for CausetteError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CausetteError>`.
pub type Result<T> = std::result::Result<T, CausetteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_with_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CausetteError = io.into();
        assert!(matches!(err, CausetteError::Io { .. }));
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn config_helper_builds_config_variant() {
        let err = CausetteError::config("missing endpoint");
        assert_eq!(err.to_string(), "Configuration error: missing endpoint");
        assert!(!err.is_serialization());
    }
}
