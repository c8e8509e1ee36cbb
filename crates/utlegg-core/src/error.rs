//! Error types for the utlegg-core library.

use thiserror::Error;

/// Main error type for the utlegg library.
#[derive(Error, Debug)]
pub enum UtleggError {
    /// Report assembly error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while assembling an expense report PDF.
///
/// Any of these aborts the whole generation; no partial document is returned.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The attachment is neither a supported image nor a PDF.
    #[error("unsupported attachment format for {file_name} (item {item})")]
    UnsupportedAttachment { item: usize, file_name: String },

    /// The attachment looked like an image but could not be decoded.
    #[error("failed to decode image {file_name}: {source}")]
    Image {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    /// Failed to parse or write PDF data.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The attached PDF is encrypted and cannot be opened.
    #[error("attachment {0} is encrypted")]
    Encrypted(String),

    /// The attached PDF has no pages.
    #[error("attachment {0} has no pages")]
    NoPages(String),

    /// Failed to encode page content.
    #[error("failed to encode page content: {0}")]
    Content(String),
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}

/// Result type for the utlegg library.
pub type Result<T> = std::result::Result<T, UtleggError>;
