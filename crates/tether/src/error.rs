//! Error types for tether operations.

use crate::domain::{DependencyType, EdgeId, IssueId};
use std::io;
use thiserror::Error;

/// The error type for tether operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An edge from an issue to itself was requested.
    #[error("Issue {0} cannot depend on itself")]
    SelfReference(IssueId),

    /// An edge with the same source, target and type already exists.
    #[error("Dependency already exists: {source_issue} --[{dep_type}]--> {target_issue} ({existing})")]
    DuplicateDependency {
        /// Source of the rejected edge.
        source_issue: IssueId,
        /// Target of the rejected edge.
        target_issue: IssueId,
        /// Type of the rejected edge.
        dep_type: DependencyType,
        /// The edge already carrying this triple.
        existing: EdgeId,
    },

    /// Inserting the `blocks` edge would close a cycle.
    #[error("Circular dependency: {from} already depends on {to} through blocks edges")]
    CircularDependency {
        /// Source of the rejected edge.
        from: IssueId,
        /// Target of the rejected edge.
        to: IssueId,
    },

    /// Issue not found.
    #[error("Issue not found: {0}")]
    IssueNotFound(IssueId),

    /// Dependency edge not found.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(EdgeId),

    /// An edge id was generated twice or inserted twice.
    #[error("Dependency id already in use: {0}")]
    EdgeIdConflict(EdgeId),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns `true` for rejections of an invalid request, as opposed to
    /// lookups or infrastructure failures.
    ///
    /// Callers translating into transport status codes map these to a
    /// conflict/bad-request class.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::SelfReference(_)
                | Error::DuplicateDependency { .. }
                | Error::CircularDependency { .. }
        )
    }

    /// Returns `true` when a referenced issue or edge does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::IssueNotFound(_) | Error::DependencyNotFound(_))
    }
}

impl From<tether_jsonl::Error> for Error {
    fn from(err: tether_jsonl::Error) -> Self {
        match err {
            tether_jsonl::Error::Io(e) => Error::Io(e),
            tether_jsonl::Error::Json(e) => Error::Json(e),
        }
    }
}

/// Errors raised while locating or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.tether` directory in the working directory or its parents.
    #[error("Not a tether repository (or any parent up to the filesystem root). Run 'tether init' first.")]
    NotInitialized,

    /// `.tether` already exists where `init` was asked to create it.
    #[error("tether is already initialized here: found existing '{0}'")]
    AlreadyInitialized(String),

    /// Configuration file could not be parsed or written.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Unknown storage backend name.
    #[error("Unknown storage backend '{0}' (expected 'memory' or 'jsonl')")]
    UnknownBackend(String),
}

/// A specialized Result type for tether operations.
pub type Result<T> = std::result::Result<T, Error>;
