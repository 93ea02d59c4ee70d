use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platform::Platform;
use crate::version::{Requirement, Version};

/// Display name of a package build: `name-version` or `name-version-platform`.
pub fn full_name(name: &str, version: &Version, platform: &Platform) -> String {
    if platform.is_generic() {
        format!("{}-{}", name, version)
    } else {
        format!("{}-{}-{}", name, version, platform)
    }
}

/// Reject full names that are not a single, visible path component of the
/// store.
pub fn check_file_name(full_name: &str) -> Result<()> {
    if full_name.is_empty()
        || full_name.starts_with('.')
        || full_name.contains("..")
        || full_name.contains(['/', '\\'])
    {
        bail!("Invalid package name {:?}", full_name);
    }
    Ok(())
}

/// A runtime dependency declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub requirement: Requirement,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.requirement)
    }
}

/// Back-reference from a candidate to the source that offered it.
///
/// `position` is the source's index in the registry, which also defines the
/// tie-break order between otherwise equal candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub position: usize,
    pub location: String,
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// A concrete package build offered by one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub version: Version,
    pub platform: Platform,
    pub source: SourceRef,
    /// Hex-encoded SHA-256 of the artifact, when the source publishes one
    pub sha256: Option<String>,
    pub dependencies: Vec<Dependency>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.version, &self.platform)
    }

    /// File name of this candidate's artifact inside its source.
    pub fn file_name(&self) -> String {
        format!("{}.gem", self.full_name())
    }
}

/// Installed-package descriptor, as written to and read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Location of the source the spec was installed from
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl Spec {
    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.version, &self.platform)
    }
}

impl From<&Candidate> for Spec {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            version: candidate.version.clone(),
            platform: candidate.platform.clone(),
            dependencies: candidate.dependencies.clone(),
            source: Some(candidate.source.location.clone()),
            sha256: candidate.sha256.clone(),
        }
    }
}
