//! Error types for the agrolink-watermark crate.

use std::path::PathBuf;

/// Errors that can occur while stamping images or recording products.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source file could not be read or is not a recognized image.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Path of the file that failed to decode.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// The watermarked image could not be encoded or written.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// Destination path.
        path: PathBuf,
        /// Underlying codec or I/O error.
        source: image::ImageError,
    },

    /// A scalable font candidate could not be loaded.
    ///
    /// Recovered by the font fallback chain; never returned by the pipeline.
    #[error("failed to load font {}: {reason}", path.display())]
    FontLoad {
        /// Font file that was tried.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
    },

    /// The owner name to stamp was empty or whitespace.
    #[error("owner name must not be empty")]
    EmptyOwnerName,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upload's file type is not accepted.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The upload exceeds the configured size limit.
    #[error("file too large ({size} bytes, limit {limit})")]
    FileTooLarge {
        /// Upload size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// A required form field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The farmer id on a product form is not an integer.
    #[error("invalid farmer id: {0}")]
    InvalidFarmerId(String),

    /// No farmer is registered under the given id.
    #[error("farmer with id {0} not found")]
    FarmerNotFound(u64),

    /// The watermark pipeline reported failure for an upload.
    #[error("failed to process image")]
    ImageProcessing,
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("gif".to_string());
        assert!(unsupported.to_string().contains("gif"));

        let too_large = Error::FileTooLarge {
            size: 6_000_000,
            limit: 5_242_880,
        };
        let msg = too_large.to_string();
        assert!(msg.contains("6000000"));
        assert!(msg.contains("5242880"));

        assert_eq!(
            Error::MissingField("Product Name").to_string(),
            "Product Name is required"
        );
        assert_eq!(Error::ImageProcessing.to_string(), "failed to process image");
    }

    #[test]
    fn decode_error_names_the_file() {
        let err = Error::Decode {
            path: PathBuf::from("uploads/farm.png"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "truncated",
            )),
        };
        let msg = err.to_string();
        assert!(msg.contains("uploads/farm.png"));
        assert!(msg.contains("truncated"));
    }
}
