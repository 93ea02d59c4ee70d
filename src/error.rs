//! Typed failures of the resolution and installation engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::version::Requirement;

/// Failure to obtain the bytes of a resolved candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Unable to reach {location}: {reason}")]
    Unreachable { location: String, reason: String },

    #[error("{file} was not found at {location}")]
    NotFoundAtSource { location: String, file: String },

    #[error("Integrity check failed for {name}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

/// Engine-level failure taxonomy.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No candidate matches the request.
    #[error("Could not find a valid gem '{name}' ({requirement}) in any repository")]
    ConstraintUnsatisfiable {
        name: String,
        requirement: Requirement,
        suggestions: Vec<String>,
    },

    /// A source could not build its index. Recovered locally by excluding
    /// the source for the rest of the run.
    #[error("Unable to use source {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// Bytes or embedded metadata did not match the resolved candidate.
    #[error("Integrity check failed for {name}: expected {expected}, got {actual}")]
    FetchIntegrityMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// The candidate's own source could not serve it.
    #[error(transparent)]
    Fetch(FetchError),

    #[error("You don't have write permissions for the {} directory.", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("{0}")]
    ConflictingOptions(String),

    #[error("Please specify at least one gem name (e.g. rgi install GEMNAME)")]
    NoPackagesRequested,

    /// Unpacking or recording the spec in the store failed.
    #[error("Error installing {name}: {reason}")]
    Install { name: String, reason: String },

    /// A dependency of the package could not be installed.
    #[error("Error installing {name}: dependency {dependency} could not be installed")]
    DependencyFailed { name: String, dependency: String },
}

impl From<FetchError> for EngineError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::IntegrityMismatch {
                name,
                expected,
                actual,
            } => EngineError::FetchIntegrityMismatch {
                name,
                expected,
                actual,
            },
            other => EngineError::Fetch(other),
        }
    }
}
