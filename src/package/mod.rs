//! Package model
//!
//! Candidates are what sources offer, specs are what the store records, and
//! artifacts are the bytes that travel between the two.

pub mod artifact;
mod candidate;

pub use artifact::ArtifactMetadata;
pub use candidate::{Candidate, Dependency, SourceRef, Spec, check_file_name, full_name};
