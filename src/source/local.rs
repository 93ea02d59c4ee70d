//! Directory of `.gem` artifacts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{IndexEntry, Source, SourceKind};
use crate::error::FetchError;
use crate::package::{Candidate, artifact};
use crate::runtime::Runtime;

const ARTIFACT_EXTENSION: &str = "gem";

pub struct LocalSource<R: Runtime> {
    runtime: Arc<R>,
    dir: PathBuf,
    location: String,
    /// Artifact path per full name, filled while indexing.
    files: Mutex<HashMap<String, PathBuf>>,
}

impl<R: Runtime> LocalSource<R> {
    pub fn new(runtime: Arc<R>, dir: PathBuf) -> Self {
        let location = dir.display().to_string();
        Self {
            runtime,
            dir,
            location,
            files: Mutex::new(HashMap::new()),
        }
    }

    fn index_file(&self, path: &Path) -> Result<IndexEntry> {
        let bytes = self.runtime.read(path)?;
        let metadata = artifact::read_metadata(&bytes)?;
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Ok(IndexEntry {
            name: metadata.name,
            version: metadata.version,
            platform: metadata.platform,
            sha256: Some(sha256),
            dependencies: metadata.dependencies,
        })
    }

    /// Path of an artifact this source indexed, `None` for anything else.
    fn artifact_path(&self, candidate: &Candidate) -> Option<PathBuf> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(&candidate.full_name()).cloned())
    }
}

#[async_trait]
impl<R: Runtime + 'static> Source for LocalSource<R> {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    fn location(&self) -> &str {
        &self.location
    }

    #[tracing::instrument(skip(self), fields(dir = %self.location))]
    async fn build_index(&self) -> Result<Vec<IndexEntry>> {
        if !self.runtime.is_dir(&self.dir) {
            debug!("Local source {:?} does not exist, nothing to index", self.dir);
            return Ok(Vec::new());
        }

        let mut paths = self
            .runtime
            .read_dir(&self.dir)
            .with_context(|| format!("Failed to list local source {:?}", self.dir))?;
        paths.retain(|p| p.extension().is_some_and(|e| e == ARTIFACT_EXTENSION));
        paths.sort();

        let mut entries = Vec::new();
        let mut files = HashMap::new();
        for path in paths {
            match self.index_file(&path) {
                Ok(entry) => {
                    let full_name = crate::package::full_name(
                        &entry.name,
                        &entry.version,
                        &entry.platform,
                    );
                    debug!("Indexed {} from {:?}", full_name, path);
                    files.insert(full_name, path);
                    entries.push(entry);
                }
                Err(e) => warn!("Skipping unreadable artifact {:?}: {:#}", path, e),
            }
        }

        if let Ok(mut known) = self.files.lock() {
            *known = files;
        }
        Ok(entries)
    }

    #[tracing::instrument(skip(self, candidate), fields(candidate = %candidate.full_name()))]
    async fn fetch_bytes(&self, candidate: &Candidate) -> Result<Vec<u8>, FetchError> {
        let not_found = || FetchError::NotFoundAtSource {
            location: self.location.clone(),
            file: candidate.file_name(),
        };
        let path = self.artifact_path(candidate).ok_or_else(not_found)?;
        if !self.runtime.exists(&path) {
            return Err(not_found());
        }
        debug!("Reading {:?}...", path);
        self.runtime
            .read(&path)
            .map_err(|e| FetchError::Unreachable {
                location: self.location.clone(),
                reason: format!("{:#}", e),
            })
    }
}
