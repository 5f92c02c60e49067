//! Fatal export errors

use std::path::PathBuf;

use thiserror::Error;

use crate::collada::WriterState;

/// Errors that abort an export. Per-texture failures never end up here; they
/// are collected in the export report instead.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML serialization failed: {0}")]
    Xml(#[from] xmltree::Error),

    /// A writer operation was called out of order
    #[error("`{operation}` is not allowed in writer state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },

    #[error("Invalid mesh data in {mesh}: {message}")]
    InvalidMeshData { mesh: String, message: String },

    /// The finished document could not be moved into place
    #[error("Failed to persist document to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Scene(#[from] daeforge_core::Error),
}

impl ExportError {
    pub(crate) fn invalid_mesh(mesh: impl Into<String>, message: impl Into<String>) -> Self {
        ExportError::InvalidMeshData {
            mesh: mesh.into(),
            message: message.into(),
        }
    }

    /// True for writer contract violations (programming errors)
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ExportError::InvalidState { .. })
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
