//! # Tool Errors
//!
//! Every way an operation can fail, as a single enumeration.
//! Handlers return these internally; they are flattened to text only at the dispatcher boundary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Error: Path not allowed: {}", .0.display())]
    PathNotAllowed(PathBuf),

    /// `what` names the missing thing ("File", "Directory", "Source file", ...).
    #[error("Error: {what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Error: Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Error: Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Error: {} is not a file. Use rmdir for directories.", .0.display())]
    IsADirectory(PathBuf),

    /// `action` reads as the tail of "Error ..." ("reading file", "copying file").
    #[error("Error {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Error: {what} timed out after {secs} seconds")]
    ProcessTimeout { what: &'static str, secs: u64 },

    #[error("Error running {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error: {0} not found. Check installation.")]
    ExecutableNotFound(&'static str),

    #[error("Error: Request timed out after {secs} seconds")]
    NetworkTimeout { secs: u64 },

    #[error("Error {action}: {message}")]
    Network {
        action: &'static str,
        message: String,
    },

    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    #[error("Error: Missing required argument '{argument}' for {operation}")]
    MissingArgument {
        operation: &'static str,
        argument: &'static str,
    },

    #[error("Error: Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
}

impl ToolError {
    pub fn io(action: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { action, source }
    }

    pub fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}
