//! Commit of one fetched candidate into the store.

use log::{debug, info};

use crate::error::EngineError;
use crate::package::{Candidate, Spec, artifact};
use crate::store::PackageStore;

/// Check that the artifact describes `candidate`, then unpack it and record
/// its descriptor.
///
/// The store either ends up with both the payload and the descriptor or keeps
/// its previous state for this spec.
#[tracing::instrument(skip(store, candidate, bytes), fields(candidate = %candidate.full_name()))]
pub fn commit<S: PackageStore + ?Sized>(
    store: &S,
    candidate: &Candidate,
    bytes: &[u8],
) -> Result<Spec, EngineError> {
    let full_name = candidate.full_name();

    let metadata = artifact::read_metadata(bytes).map_err(|e| EngineError::Install {
        name: full_name.clone(),
        reason: format!("{:#}", e),
    })?;
    if metadata.name != candidate.name
        || metadata.version != candidate.version
        || metadata.platform != candidate.platform
    {
        return Err(EngineError::FetchIntegrityMismatch {
            name: full_name,
            expected: candidate.full_name(),
            actual: metadata.full_name(),
        });
    }
    debug!("Artifact metadata matches {}", full_name);

    let spec = Spec::from(candidate);
    store
        .write(&spec, bytes)
        .map_err(|e| EngineError::Install {
            name: full_name.clone(),
            reason: format!("{:#}", e),
        })?;

    info!("Installed {}", full_name);
    Ok(spec)
}
