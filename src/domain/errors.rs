//! Domain error types
//!
//! This module defines the error hierarchy for the ingest pipeline.
//! Errors from third-party crates are converted into domain variants and
//! never leak through the public API.

use thiserror::Error;

/// Main ingest error type
///
/// This is the primary error type used throughout the crate. Gateway and
/// image service failures convert into it with `?`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The annotation document could not be tokenized
    #[error("Parse error at byte {position}: {message}")]
    Parse {
        /// Byte offset into the document where the failure was detected
        position: u64,
        /// Tokenizer message
        message: String,
    },

    /// Persistence gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Image resolution service errors
    #[error("Image service error: {0}")]
    ImageService(#[from] ImageServiceError),

    /// Database errors raised below the gateway (pool, connection)
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl IngestError {
    /// Builds a parse error at the given byte offset
    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Persistence gateway errors
///
/// Raised by implementations of the occurrence gateway and image store.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Failed to reach the backing store
    #[error("Failed to connect to record store: {0}")]
    ConnectionFailed(String),

    /// A lookup query failed
    #[error("Lookup failed: {0}")]
    QueryFailed(String),

    /// The store rejected a record; carries the store's own message
    #[error("{0}")]
    SaveFailed(String),

    /// A record referenced by id does not exist
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl GatewayError {
    /// Returns the raw message reported by the store
    pub fn message(&self) -> String {
        match self {
            Self::SaveFailed(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Image resolution service errors
#[derive(Debug, Error)]
pub enum ImageServiceError {
    /// Failed to connect to the service
    #[error("Failed to connect to image service: {0}")]
    ConnectionFailed(String),

    /// The service does not know the access URI
    #[error("Image not found for access URI: {0}")]
    NotFound(String),

    /// Invalid response from the service
    #[error("Invalid response from image service: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl ImageServiceError {
    /// Whether the request may succeed if retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::ServerError { .. } | Self::Timeout(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for IngestError {
    fn from(err: toml::de::Error) -> Self {
        IngestError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_display() {
        let err = IngestError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_parse_error_carries_position() {
        let err = IngestError::parse(42, "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "Parse error at byte 42: unexpected end of input"
        );
        assert!(matches!(err, IngestError::Parse { position: 42, .. }));
    }

    #[test]
    fn test_gateway_error_conversion() {
        let gateway_err = GatewayError::ConnectionFailed("refused".to_string());
        let err: IngestError = gateway_err.into();
        assert!(matches!(err, IngestError::Gateway(_)));
    }

    #[test]
    fn test_save_failed_message_is_raw() {
        let err = GatewayError::SaveFailed("duplicate key".to_string());
        assert_eq!(err.message(), "duplicate key");
        assert_eq!(err.to_string(), "duplicate key");
    }

    #[test]
    fn test_image_service_error_retryable() {
        assert!(ImageServiceError::Timeout("30s".to_string()).is_retryable());
        assert!(ImageServiceError::ServerError {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!ImageServiceError::NotFound("http://x".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: IngestError = io_err.into();
        assert!(matches!(err, IngestError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: IngestError = toml_err.into();
        assert!(matches!(err, IngestError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
