//! Artifact retrieval for resolved candidates.

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::FetchError;
use crate::package::Candidate;
use crate::source::SourceRegistry;

/// Fetch the artifact of `candidate` from the source that produced it.
///
/// There is no fallback: if that source cannot serve the candidate, the fetch
/// fails even when another source holds a file of the same name.
#[tracing::instrument(skip(registry, candidate), fields(candidate = %candidate.full_name()))]
pub async fn fetch(
    registry: &SourceRegistry,
    candidate: &Candidate,
) -> Result<Vec<u8>, FetchError> {
    let source = registry
        .get(&candidate.source)
        .ok_or_else(|| FetchError::Unreachable {
            location: candidate.source.location.clone(),
            reason: "source is not registered".to_string(),
        })?;

    debug!(
        "Fetching {} from {}...",
        candidate.file_name(),
        candidate.source
    );
    let bytes = source.fetch_bytes(candidate).await?;
    verify(candidate, &bytes)?;
    Ok(bytes)
}

/// Check `bytes` against the digest published for `candidate`, if any.
pub fn verify(candidate: &Candidate, bytes: &[u8]) -> Result<(), FetchError> {
    let Some(expected) = &candidate.sha256 else {
        debug!("No digest published for {}", candidate.full_name());
        return Ok(());
    };
    let actual = hex::encode(Sha256::digest(bytes));
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(FetchError::IntegrityMismatch {
            name: candidate.full_name(),
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}
