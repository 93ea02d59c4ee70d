//! Package sources.
//!
//! A source is a queryable origin of package artifacts: a local directory of
//! `.gem` files or a remote HTTP endpoint. Sources are registered in order in
//! a [`SourceRegistry`]; the position is the tie-break between candidates.

mod local;
mod registry;
mod remote;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FetchError;
use crate::package::{Candidate, Dependency, SourceRef, full_name};
use crate::platform::Platform;
use crate::version::Version;

pub use local::LocalSource;
pub use registry::{SourceNotice, SourceRegistry};
pub use remote::RemoteSource;

/// Where a source keeps its artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Remote => write!(f, "remote"),
        }
    }
}

/// Which kinds of sources a request may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    Local,
    Remote,
    #[default]
    Both,
}

impl Domain {
    pub fn allows(self, kind: SourceKind) -> bool {
        match self {
            Domain::Local => kind == SourceKind::Local,
            Domain::Remote => kind == SourceKind::Remote,
            Domain::Both => true,
        }
    }
}

/// One entry of a source's index, before it is bound to the source's
/// position in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl IndexEntry {
    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.version, &self.platform)
    }

    pub fn into_candidate(self, source: SourceRef) -> Candidate {
        Candidate {
            name: self.name,
            version: self.version,
            platform: self.platform,
            source,
            sha256: self.sha256,
            dependencies: self.dependencies,
        }
    }
}

/// Trait for package sources.
///
/// The domain filter is applied by the registry through [`Source::kind`], so
/// implementations only need to list and serve what they hold.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Directory path or base URL, used in messages and descriptors.
    fn location(&self) -> &str;

    /// List every package build this source offers. Malformed entries are
    /// skipped; an error means the whole source is unusable.
    async fn build_index(&self) -> Result<Vec<IndexEntry>>;

    /// Retrieve the artifact bytes of a candidate this source indexed.
    async fn fetch_bytes(&self, candidate: &Candidate) -> Result<Vec<u8>, FetchError>;
}
