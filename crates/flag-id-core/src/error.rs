//! Error types for the flag matching core.

use thiserror::Error;

/// Errors surfaced by the match engine and its collaborators.
///
/// Narrowing outcomes (a bucket with no flags, a cascade that ends with zero
/// candidates) are never errors; only configuration and I/O failures are.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An image could not be read or decoded. Fatal for that query only.
    #[error("Failed to load image {path}: {source}")]
    Load {
        /// Path or identifier of the unreadable image.
        path: String,
        /// Underlying decoder or I/O error.
        #[source]
        source: image::ImageError,
    },

    /// A configuration value is out of range. Raised at startup, never while matching.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The reference corpus contains the same flag identifier twice.
    #[error("Duplicate flag identifier in reference corpus: {0}")]
    DuplicateFlag(String),
}

/// Convenience alias for core results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_message() {
        let err = Error::InvalidConfiguration("ratio_tolerance must be >= 0, got -1".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: ratio_tolerance must be >= 0, got -1"
        );
    }

    #[test]
    fn test_load_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::Load {
            path: "flags/Texas.jpg".into(),
            source: image::ImageError::IoError(io),
        };
        assert!(err.to_string().contains("flags/Texas.jpg"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
