use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure reported by the graph-algorithms backend.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The backend does not provide `operation`.
    pub fn unsupported(operation: &str) -> Self {
        Self::new(format!("{operation} is not provided by this backend"))
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Input resource missing or unreadable.
    #[error("Could not open file {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Header or document shape violates the expected schema.
    #[error("{0}")]
    Format(String),

    /// Well-formed input that is semantically invalid.
    #[error("{0}")]
    Validation(String),

    #[error("{algorithm} failed: {source}")]
    Collaborator {
        algorithm: String,
        #[source]
        source: CollaboratorError,
    },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn collaborator(algorithm: impl Into<String>, source: CollaboratorError) -> Self {
        Self::Collaborator {
            algorithm: algorithm.into(),
            source,
        }
    }

    /// Stable lowercase name of the taxonomy bucket, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resource { .. } => "resource",
            Self::Format(_) => "format",
            Self::Validation(_) => "validation",
            Self::Collaborator { .. } => "collaborator",
        }
    }
}
