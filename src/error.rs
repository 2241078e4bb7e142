//! Errors raised while building and finalizing a schema model.

use std::path::PathBuf;

/// Coarse classification of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A column, table, domain or behavior name does not resolve.
    Reference,
    /// An external schema cannot be located or parsed.
    SchemaLoad,
    /// A structural invariant of the model is violated.
    Constraint,
    /// The input tree is malformed.
    Configuration,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Unresolved reference: {0}")]
    Reference(String),
    #[error("Cannot load schema {}: {reason}", path.display())]
    SchemaLoad { path: PathBuf, reason: String },
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Reference(_) => ErrorKind::Reference,
            Self::SchemaLoad { .. } => ErrorKind::SchemaLoad,
            Self::Constraint(_) => ErrorKind::Constraint,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SchemaLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
