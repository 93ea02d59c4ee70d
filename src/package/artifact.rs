//! Package artifact codec.
//!
//! An artifact is a gzip-compressed tar holding `metadata.json` and the
//! payload files under `data/`.

use anyhow::{Context, Result, anyhow, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use super::{Dependency, full_name};
use crate::platform::Platform;
use crate::runtime::Runtime;
use crate::version::Version;

const METADATA_ENTRY: &str = "metadata.json";
const DATA_DIR: &str = "data";

/// Metadata embedded in every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ArtifactMetadata {
    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.version, &self.platform)
    }
}

/// Read the embedded metadata without unpacking the payload.
pub fn read_metadata(bytes: &[u8]) -> Result<ArtifactMetadata> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    for entry in archive.entries().context("Failed to read artifact")? {
        let mut entry = entry.context("Failed to read artifact entry")?;
        if entry.path()? == Path::new(METADATA_ENTRY) {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .context("Failed to read artifact metadata")?;
            return serde_json::from_str(&content).context("Failed to parse artifact metadata");
        }
    }
    Err(anyhow!("Artifact has no {}", METADATA_ENTRY))
}

/// Map an archive path under `data/` to a path relative to the install
/// directory. Returns `None` for entries outside `data/` and rejects entries
/// that would escape the destination.
fn payload_path(entry_path: &Path) -> Result<Option<PathBuf>> {
    let Ok(relative) = entry_path.strip_prefix(DATA_DIR) else {
        return Ok(None);
    };
    if relative.as_os_str().is_empty() {
        return Ok(None);
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        bail!("Artifact entry escapes the install directory: {:?}", entry_path);
    }
    Ok(Some(relative.to_path_buf()))
}

/// Unpack the payload of an artifact into `dest`.
///
/// Returns the unpacked file paths relative to `dest`.
#[tracing::instrument(skip(runtime, bytes))]
pub fn unpack<R: Runtime + ?Sized>(
    runtime: &R,
    bytes: &[u8],
    dest: &Path,
) -> Result<Vec<PathBuf>> {
    debug!("Unpacking artifact into {:?}...", dest);
    runtime.create_dir_all(dest)?;

    let mut files = Vec::new();
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    for entry in archive.entries().context("Failed to read artifact")? {
        let mut entry = entry.context("Failed to read artifact entry")?;
        let entry_path = entry.path()?.into_owned();
        let Some(relative) = payload_path(&entry_path)? else {
            continue;
        };

        let full_path = dest.join(&relative);
        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            runtime.create_dir_all(&full_path)?;
            continue;
        }
        if !entry_type.is_file() {
            debug!("Skipping non-regular entry {:?}", entry_path);
            continue;
        }

        if let Some(parent) = full_path.parent() {
            runtime.create_dir_all(parent)?;
        }
        let mut dest_file = runtime.create_file(&full_path)?;
        std::io::copy(&mut entry, &mut dest_file)
            .with_context(|| format!("Failed to extract file {:?}", full_path))?;

        #[cfg(unix)]
        if let Ok(mode) = entry.header().mode()
            && let Err(e) = runtime.set_permissions(&full_path, mode)
        {
            debug!("Failed to set permissions on {:?}: {}", full_path, e);
        }

        files.push(relative);
    }

    Ok(files)
}

/// Build an artifact from metadata and `(path, content)` payload files.
pub fn build(metadata: &ArtifactMetadata, files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar = tar::Builder::new(encoder);

    let meta_json = serde_json::to_vec_pretty(metadata)?;
    append(&mut tar, METADATA_ENTRY, &meta_json, 0o644)?;
    for (path, content) in files {
        append(&mut tar, &format!("{}/{}", DATA_DIR, path), content, 0o644)?;
    }

    let encoder = tar.into_inner().context("Failed to finish artifact")?;
    encoder.finish().context("Failed to compress artifact")
}

fn append<W: std::io::Write>(
    tar: &mut tar::Builder<W>,
    path: &str,
    content: &[u8],
    mode: u32,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(mode);
    header.set_cksum();
    tar.append_data(&mut header, path, content)
        .with_context(|| format!("Failed to add {} to artifact", path))
}
