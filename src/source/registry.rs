//! Ordered registry of package sources with a per-run index cache.

use futures_util::future::join_all;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::{Domain, Source};
use crate::error::EngineError;
use crate::package::{Candidate, SourceRef, check_file_name};

/// A source that was excluded for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNotice {
    pub location: String,
    pub reason: String,
}

impl From<&SourceNotice> for EngineError {
    fn from(notice: &SourceNotice) -> Self {
        EngineError::SourceUnavailable {
            location: notice.location.clone(),
            reason: notice.reason.clone(),
        }
    }
}

enum IndexState {
    Ready(Arc<Vec<Candidate>>),
    Failed,
}

/// Registry of package sources.
///
/// Sources keep the position they were added at. Indexes are built once per
/// run and cached by position; a source whose index fails to build is marked
/// failed and contributes no candidates until the registry is dropped.
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
    indexes: HashMap<usize, IndexState>,
    notices: Vec<SourceNotice>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. Indexes already built for other sources stay cached.
    pub fn add(&mut self, source: Arc<dyn Source>) -> SourceRef {
        let source_ref = SourceRef {
            position: self.sources.len(),
            location: source.location().to_string(),
        };
        debug!(
            "Registered {} source {} at position {}",
            source.kind(),
            source_ref.location,
            source_ref.position
        );
        self.sources.push(source);
        source_ref
    }

    /// The source a candidate was produced by.
    pub fn get(&self, source_ref: &SourceRef) -> Option<&Arc<dyn Source>> {
        self.sources
            .get(source_ref.position)
            .filter(|s| s.location() == source_ref.location)
    }

    /// Sources excluded during this run, in the order they failed.
    pub fn notices(&self) -> &[SourceNotice] {
        &self.notices
    }

    /// Build the indexes of every source in `domain` that has not been
    /// indexed yet. Builds run concurrently; results are stored by position.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&mut self, domain: Domain) {
        let pending: Vec<usize> = self
            .sources
            .iter()
            .enumerate()
            .filter(|(i, s)| domain.allows(s.kind()) && !self.indexes.contains_key(i))
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return;
        }

        let builds = pending.iter().map(|&position| {
            let source = Arc::clone(&self.sources[position]);
            async move { (position, source.build_index().await) }
        });
        let mut results = join_all(builds).await;
        results.sort_by_key(|(position, _)| *position);

        for (position, result) in results {
            let location = self.sources[position].location().to_string();
            let state = match result {
                Ok(entries) => {
                    debug!("Source {} offers {} builds", location, entries.len());
                    let source_ref = SourceRef {
                        position,
                        location,
                    };
                    let candidates = entries
                        .into_iter()
                        .filter(|e| match check_file_name(&e.full_name()) {
                            Ok(()) => true,
                            Err(err) => {
                                warn!("Skipping entry of {}: {}", source_ref.location, err);
                                false
                            }
                        })
                        .map(|e| e.into_candidate(source_ref.clone()))
                        .collect();
                    IndexState::Ready(Arc::new(candidates))
                }
                Err(e) => {
                    let notice = SourceNotice {
                        location,
                        reason: format!("{:#}", e),
                    };
                    warn!("{}", EngineError::from(&notice));
                    self.notices.push(notice);
                    IndexState::Failed
                }
            };
            self.indexes.insert(position, state);
        }
    }

    /// All candidates from the healthy sources in `domain`, in source order.
    pub async fn candidates(&mut self, domain: Domain) -> Vec<Candidate> {
        self.refresh(domain).await;

        let mut all = Vec::new();
        for (position, source) in self.sources.iter().enumerate() {
            if !domain.allows(source.kind()) {
                continue;
            }
            if let Some(IndexState::Ready(candidates)) = self.indexes.get(&position) {
                all.extend(candidates.iter().cloned());
            }
        }
        all
    }
}
