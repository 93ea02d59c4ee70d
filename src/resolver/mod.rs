//! Candidate selection.
//!
//! Each requested name is resolved on its own: the resolver gathers the
//! candidates of every healthy source in the requested domain and picks the
//! greatest version that satisfies the request on the running platform.

mod suggest;

use log::debug;
use std::cmp::{Ordering, Reverse};
use std::fmt;

use crate::error::EngineError;
use crate::package::{Candidate, Spec};
use crate::platform::Platform;
use crate::source::{Domain, SourceRegistry};
use crate::version::{Requirement, Version};

pub use suggest::{edit_distance, suggest};

/// One name to resolve, with its constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub name: String,
    pub requirement: Requirement,
    /// Accept prerelease versions even under a release-only constraint
    pub prerelease: bool,
}

impl Request {
    pub fn new(name: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            name: name.into(),
            requirement,
            prerelease: false,
        }
    }

    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// A constraint naming a prerelease enables prereleases for this
    /// request only.
    pub fn accepts_prerelease(&self) -> bool {
        self.prerelease || self.requirement.is_prerelease()
    }

    pub fn matches(&self, name: &str, version: &Version) -> bool {
        self.name == name && self.requirement.allows(version, self.accepts_prerelease())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.requirement)
    }
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Candidate),
    NotFound {
        name: String,
        requirement: Requirement,
        suggestions: Vec<String>,
    },
}

impl Resolution {
    pub fn into_result(self) -> Result<Candidate, EngineError> {
        match self {
            Resolution::Found(candidate) => Ok(candidate),
            Resolution::NotFound {
                name,
                requirement,
                suggestions,
            } => Err(EngineError::ConstraintUnsatisfiable {
                name,
                requirement,
                suggestions,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    platform: Platform,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Platform::local())
    }
}

impl Resolver {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Pick the best candidate for `request` from `candidates`.
    ///
    /// Greatest version wins; ties go to the more specific platform, then to
    /// the earlier source position.
    pub fn select<'a>(
        &self,
        request: &Request,
        candidates: &'a [Candidate],
    ) -> Option<&'a Candidate> {
        candidates
            .iter()
            .filter(|c| request.matches(&c.name, &c.version))
            .filter(|c| c.platform.matches(&self.platform))
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if Self::rank(c).cmp(&Self::rank(b)) != Ordering::Greater => Some(b),
                _ => Some(c),
            })
    }

    fn rank(c: &Candidate) -> (&Version, u8, Reverse<usize>) {
        (&c.version, c.platform.specificity(), Reverse(c.source.position))
    }

    /// Resolve `request` against the healthy sources of `domain`.
    ///
    /// Sources that fail to index are excluded and noted in the registry;
    /// they never abort the resolution.
    #[tracing::instrument(skip(self, registry, installed), fields(request = %request))]
    pub async fn resolve(
        &self,
        registry: &mut SourceRegistry,
        domain: Domain,
        request: &Request,
        installed: &[Spec],
    ) -> Resolution {
        let candidates = registry.candidates(domain).await;
        if let Some(found) = self.select(request, &candidates) {
            debug!("Resolved {} to {}", request, found.full_name());
            return Resolution::Found(found.clone());
        }

        let known = installed
            .iter()
            .map(|s| s.name.as_str())
            .chain(
                candidates
                    .iter()
                    .filter(|c| c.platform.matches(&self.platform))
                    .map(|c| c.name.as_str()),
            );
        let suggestions = suggest(&request.name, known);
        debug!("No candidate for {}, suggestions: {:?}", request, suggestions);

        Resolution::NotFound {
            name: request.name.clone(),
            requirement: request.requirement.clone(),
            suggestions,
        }
    }
}
