//! Error types for the docx watermark library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the docx watermark library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container error
    #[error("Package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parse or write error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML that we still cannot make sense of
    #[error("Invalid XML in {part}: {reason}")]
    InvalidXml { part: String, reason: String },

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A part the document needs is absent from the package
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// The document body has no paragraph to borrow revision ids from
    #[error("Document body has no paragraphs")]
    NoBodyParagraph,

    /// Watermark text was empty
    #[error("Watermark text must not be empty")]
    EmptyWatermarkText,

    /// Structurally invalid WordprocessingML
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// General error
    #[error("{0}")]
    General(String),
}
