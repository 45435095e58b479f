//! Error types for slide deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a slide description or writing a deck.
///
/// Flattening never fails; every variant here belongs to the boundary
/// around it (input loading and the PPTX writer).
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read input or write the output file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The slide description could not be parsed.
    #[error("Invalid slide description: {0}")]
    InvalidDescription(String),

    /// ZIP archive error while packaging the deck.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML serialization error while writing a part.
    #[error("XML writing error: {0}")]
    XmlError(String),
}
