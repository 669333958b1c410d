//! Error types for survey-embed

use thiserror::Error;

/// Result type alias for survey-embed operations
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Main error type for the embedding pipeline
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(
        "UMAP requested but this build has no UMAP support. \
         Rebuild with the `umap` feature or remove 'umap' from --methods."
    )]
    UmapUnavailable,

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for EmbedError {
    fn from(err: polars::error::PolarsError) -> Self {
        EmbedError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for EmbedError {
    fn from(err: serde_json::Error) -> Self {
        EmbedError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for EmbedError {
    fn from(err: ndarray::ShapeError) -> Self {
        EmbedError::ComputationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmbedError::ConfigError("Unknown method: tsne".to_string());
        assert_eq!(err.to_string(), "Configuration error: Unknown method: tsne");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EmbedError = io_err.into();
        assert!(matches!(err, EmbedError::IoError(_)));
    }

    #[test]
    fn test_umap_unavailable_mentions_feature() {
        let msg = EmbedError::UmapUnavailable.to_string();
        assert!(msg.contains("umap"));
    }
}
