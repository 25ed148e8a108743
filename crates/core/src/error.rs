//! Error types for Markdown to PowerPoint conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or writing a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input file or template.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// A template could not be loaded as a presentation package.
    #[error("Invalid template: {0}")]
    TemplateError(String),

    /// A part the package structure requires is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// No usable slide layout for the requested role.
    #[error("Slide layout error: {0}")]
    LayoutError(String),

    /// The addressed shape has no text frame.
    #[error("Shape has no text frame: {0}")]
    NoTextFrame(String),

    /// Text cannot be stored in the document (e.g. XML-illegal characters).
    #[error("Invalid text: {0}")]
    InvalidText(String),

    /// A raw markup fragment could not be parsed or spliced.
    #[error("Markup error: {0}")]
    MarkupError(String),

    /// The target object does not expose the requested capability.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),
}
