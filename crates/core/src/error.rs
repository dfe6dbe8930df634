//! Error types for report assembly and export.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or exporting a competency report.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A user action was rejected before any state changed.
    #[error("{0}")]
    Validation(String),

    /// An image could not be opened or decoded.
    #[error("Image error ({path}): {message}")]
    ImageError { path: String, message: String },

    /// The project file is malformed or has an unsupported version.
    #[error("Project file error: {0}")]
    ProjectFormat(String),

    /// A page reference does not exist in the current pagination.
    #[error("Unknown page: {0}")]
    UnknownPage(String),

    /// An overlay index does not exist on the given page.
    #[error("No image #{index} on {anchor}")]
    UnknownOverlay { anchor: String, index: usize },

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX and SVG).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Failed to assemble the slide deck.
    #[error("Export error: {0}")]
    ExportError(String),
}

impl Error {
    /// Build an image error for the given source path.
    pub fn image(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::ImageError {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// True for errors caused by user input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::ProjectFormat(e.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlError(e.to_string())
    }
}
