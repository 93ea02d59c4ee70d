//! Installed package store.
//!
//! # Layout
//!
//! - `<root>/gems/<full_name>/` - unpacked payload
//! - `<root>/specifications/<full_name>.json` - descriptor (a serialized [`Spec`])
//! - `<root>/doc/<full_name>/` - post-install hook output

mod dir;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::package::Spec;

pub use dir::DirStore;

pub const GEMS_DIR: &str = "gems";
pub const SPECIFICATIONS_DIR: &str = "specifications";
pub const DOC_DIR: &str = "doc";

#[cfg_attr(test, mockall::automock)]
pub trait PackageStore: Send + Sync {
    fn root(&self) -> &Path;

    /// Whether the current user may write into the store root.
    fn is_writable(&self) -> bool;

    /// Every spec with a descriptor in the store. Unreadable descriptors are
    /// skipped.
    fn list_installed(&self) -> Result<Vec<Spec>>;

    /// Unpack `payload` and record `spec`, replacing any previous install of
    /// the same full name. On failure the store keeps its prior state for
    /// this spec. Returns the payload directory.
    fn write(&self, spec: &Spec, payload: &[u8]) -> Result<PathBuf>;

    fn descriptor_path(&self, spec: &Spec) -> PathBuf;

    /// Directory holding the unpacked payload of `spec`.
    fn gem_dir(&self, spec: &Spec) -> PathBuf {
        self.root().join(GEMS_DIR).join(spec.full_name())
    }
}
