//! Error types for the flashmap CLI

use std::path::PathBuf;

use flashmap_core::area::LayoutError;
use thiserror::Error;

/// Errors that can occur while running a command
#[derive(Debug, Error)]
pub enum CliError {
    /// A flash area operation failed
    #[error("flash error: {0}")]
    Flash(#[from] flashmap_core::Error),

    /// The area table is invalid or could not be loaded
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No area matches the given id or name
    #[error("unknown area '{0}'")]
    UnknownArea(String),

    /// A command argument is out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Progress bar template error
    #[error(transparent)]
    Template(#[from] indicatif::style::TemplateError),
}

impl CliError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
