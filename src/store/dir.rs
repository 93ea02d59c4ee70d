//! Directory-backed store over the [`Runtime`] abstraction.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{GEMS_DIR, PackageStore, SPECIFICATIONS_DIR};
use crate::package::{Spec, artifact, check_file_name};
use crate::runtime::Runtime;

const DESCRIPTOR_EXTENSION: &str = "json";

pub struct DirStore<R: Runtime> {
    runtime: Arc<R>,
    root: PathBuf,
}

impl<R: Runtime> DirStore<R> {
    pub fn new(runtime: Arc<R>, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    fn gems_dir(&self) -> PathBuf {
        self.root.join(GEMS_DIR)
    }

    fn specifications_dir(&self) -> PathBuf {
        self.root.join(SPECIFICATIONS_DIR)
    }

    fn remove_if_exists(&self, path: &Path) {
        if !self.runtime.exists(path) {
            return;
        }
        let result = if self.runtime.is_dir(path) {
            self.runtime.remove_dir_all(path)
        } else {
            self.runtime.remove_file(path)
        };
        if let Err(e) = result {
            debug!("Failed to remove {:?}: {}", path, e);
        }
    }

    /// Move the payload and descriptor from their staging paths into place.
    /// A previous payload is kept at `backup` until the descriptor is
    /// committed and restored if anything fails.
    fn commit(
        &self,
        staging: &Path,
        target: &Path,
        backup: &Path,
        descriptor_tmp: &Path,
        descriptor: &Path,
    ) -> Result<()> {
        let had_previous = self.runtime.exists(target);
        if had_previous {
            self.remove_if_exists(backup);
            self.runtime
                .rename(target, backup)
                .with_context(|| format!("Failed to move aside {:?}", target))?;
        }

        let result = self
            .runtime
            .rename(staging, target)
            .with_context(|| format!("Failed to move payload into {:?}", target))
            .and_then(|_| {
                self.runtime
                    .rename(descriptor_tmp, descriptor)
                    .with_context(|| format!("Failed to write descriptor {:?}", descriptor))
            });

        if let Err(e) = result {
            self.remove_if_exists(target);
            if had_previous && let Err(restore) = self.runtime.rename(backup, target) {
                warn!("Failed to restore {:?} from {:?}: {}", target, backup, restore);
            }
            return Err(e);
        }

        if had_previous {
            self.remove_if_exists(backup);
        }
        Ok(())
    }
}

impl<R: Runtime> PackageStore for DirStore<R> {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_writable(&self) -> bool {
        self.runtime.is_writable(&self.root)
    }

    #[tracing::instrument(skip(self))]
    fn list_installed(&self) -> Result<Vec<Spec>> {
        let dir = self.specifications_dir();
        if !self.runtime.is_dir(&dir) {
            return Ok(Vec::new());
        }

        let mut paths = self.runtime.read_dir(&dir)?;
        paths.retain(|p| {
            p.extension().is_some_and(|e| e == DESCRIPTOR_EXTENSION)
                && !p
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with('.'))
        });
        paths.sort();

        let mut specs = Vec::new();
        for path in paths {
            let parsed = self
                .runtime
                .read_to_string(&path)
                .and_then(|json| serde_json::from_str::<Spec>(&json).map_err(Into::into));
            match parsed {
                Ok(spec) => specs.push(spec),
                Err(e) => warn!("Skipping unreadable descriptor {:?}: {:#}", path, e),
            }
        }
        Ok(specs)
    }

    #[tracing::instrument(skip(self, spec, payload), fields(spec = %spec.full_name()))]
    fn write(&self, spec: &Spec, payload: &[u8]) -> Result<PathBuf> {
        let full_name = spec.full_name();
        check_file_name(&full_name)?;
        let gems_dir = self.gems_dir();
        let specs_dir = self.specifications_dir();
        self.runtime.create_dir_all(&gems_dir)?;
        self.runtime.create_dir_all(&specs_dir)?;

        let target = gems_dir.join(&full_name);
        let staging = gems_dir.join(format!(".{}.partial", full_name));
        let backup = gems_dir.join(format!(".{}.old", full_name));
        let descriptor = self.descriptor_path(spec);
        let descriptor_tmp = specs_dir.join(format!(".{}.json.partial", full_name));

        self.remove_if_exists(&staging);
        debug!("Staging {} in {:?}...", full_name, staging);

        let staged = artifact::unpack(self.runtime.as_ref(), payload, &staging)
            .and_then(|_| {
                let json = serde_json::to_string_pretty(spec)?;
                self.runtime.write(&descriptor_tmp, json.as_bytes())
            })
            .and_then(|_| self.commit(&staging, &target, &backup, &descriptor_tmp, &descriptor));

        if let Err(e) = staged {
            self.remove_if_exists(&staging);
            self.remove_if_exists(&descriptor_tmp);
            return Err(e).with_context(|| format!("Failed to install {}", full_name));
        }

        debug!("Installed {} into {:?}", full_name, target);
        Ok(target)
    }

    fn descriptor_path(&self, spec: &Spec) -> PathBuf {
        self.specifications_dir()
            .join(format!("{}.{}", spec.full_name(), DESCRIPTOR_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::ArtifactMetadata;
    use crate::platform::Platform;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::version::Version;
    use std::fs;
    use tempfile::tempdir;

    fn spec(name: &str, version: &str) -> Spec {
        Spec {
            name: name.to_string(),
            version: Version::parse(version).unwrap(),
            platform: Platform::Ruby,
            dependencies: vec![],
            source: Some("/work".to_string()),
            sha256: None,
        }
    }

    fn payload(spec: &Spec, file: &str, content: &[u8]) -> Vec<u8> {
        let metadata = ArtifactMetadata {
            name: spec.name.clone(),
            version: spec.version.clone(),
            platform: spec.platform.clone(),
            dependencies: vec![],
        };
        artifact::build(&metadata, &[(file, content)]).unwrap()
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with('.'))
            .collect()
    }

    #[test]
    fn test_write_and_list_installed() {
        // --- Setup ---
        let dir = tempdir().unwrap();
        let store = DirStore::new(Arc::new(RealRuntime), dir.path().to_path_buf());
        let a = spec("a", "2");

        // --- Execute ---
        let gem_dir = store.write(&a, &payload(&a, "lib/a.rb", b"puts 1")).unwrap();

        // --- Verify ---
        assert_eq!(gem_dir, dir.path().join("gems/a-2"));
        assert_eq!(store.gem_dir(&a), gem_dir);
        assert_eq!(
            fs::read_to_string(gem_dir.join("lib/a.rb")).unwrap(),
            "puts 1"
        );
        assert_eq!(
            store.descriptor_path(&a),
            dir.path().join("specifications/a-2.json")
        );
        assert_eq!(store.list_installed().unwrap(), vec![a]);
        assert!(leftovers(&dir.path().join("gems")).is_empty());
        assert!(leftovers(&dir.path().join("specifications")).is_empty());
    }

    #[test]
    fn test_write_replaces_previous_install() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(Arc::new(RealRuntime), dir.path().to_path_buf());
        let a = spec("a", "2");

        store.write(&a, &payload(&a, "old.rb", b"old")).unwrap();
        let gem_dir = store.write(&a, &payload(&a, "new.rb", b"new")).unwrap();

        assert!(gem_dir.join("new.rb").exists());
        assert!(!gem_dir.join("old.rb").exists());
        assert_eq!(store.list_installed().unwrap().len(), 1);
        assert!(leftovers(&dir.path().join("gems")).is_empty());
    }

    #[test]
    fn test_write_garbage_payload_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(Arc::new(RealRuntime), dir.path().to_path_buf());
        let a = spec("a", "2");

        let err = store.write(&a, b"not an artifact").unwrap_err();

        assert!(err.to_string().contains("Failed to install a-2"));
        assert!(!dir.path().join("gems/a-2").exists());
        assert!(!store.descriptor_path(&a).exists());
        assert!(leftovers(&dir.path().join("gems")).is_empty());
    }

    #[test]
    fn test_write_rejects_name_outside_store() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("store");
        let store = DirStore::new(Arc::new(RealRuntime), root.clone());
        let evil = spec("../../pwned", "1");

        let err = store.write(&evil, &payload(&evil, "x.rb", b"x")).unwrap_err();

        assert!(err.to_string().contains("Invalid package name"));
        assert!(!root.exists());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_failed_descriptor_commit_restores_previous_payload() {
        // --- Setup ---
        let dir = tempdir().unwrap();
        let store = DirStore::new(Arc::new(RealRuntime), dir.path().to_path_buf());
        let a = spec("a", "2");

        let previous = dir.path().join("gems/a-2");
        fs::create_dir_all(&previous).unwrap();
        fs::write(previous.join("old.rb"), b"old").unwrap();
        // A non-empty directory where the descriptor goes makes the final
        // rename fail
        let blocker = dir.path().join("specifications/a-2.json");
        fs::create_dir_all(&blocker).unwrap();
        fs::write(blocker.join("x"), b"x").unwrap();

        // --- Execute ---
        let result = store.write(&a, &payload(&a, "new.rb", b"new"));

        // --- Verify ---
        assert!(result.is_err());
        assert!(previous.join("old.rb").exists());
        assert!(!previous.join("new.rb").exists());
        assert!(leftovers(&dir.path().join("gems")).is_empty());
        assert!(leftovers(&dir.path().join("specifications")).is_empty());
    }

    #[test]
    fn test_list_installed_skips_malformed_descriptors() {
        let dir = tempdir().unwrap();
        let specs = dir.path().join("specifications");
        fs::create_dir_all(&specs).unwrap();
        fs::write(specs.join("b-1.json"), r#"{"name": "b", "version": "1"}"#).unwrap();
        fs::write(specs.join("broken-1.json"), "{").unwrap();
        fs::write(specs.join(".c-1.json.partial"), "{}").unwrap();
        fs::write(specs.join("README"), "ignored").unwrap();

        let store = DirStore::new(Arc::new(RealRuntime), dir.path().to_path_buf());
        let installed = store.list_installed().unwrap();

        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].full_name(), "b-1");
    }

    #[test]
    fn test_list_installed_empty_store() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_is_dir()
            .withf(|p| p == Path::new("/store/specifications"))
            .return_const(false);

        let store = DirStore::new(Arc::new(runtime), PathBuf::from("/store"));
        assert!(store.list_installed().unwrap().is_empty());
    }

    #[test]
    fn test_is_writable_delegates_to_runtime() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_is_writable()
            .withf(|p| p == Path::new("/opt/gems"))
            .return_const(false);

        let store = DirStore::new(Arc::new(runtime), PathBuf::from("/opt/gems"));
        assert!(!store.is_writable());
        assert_eq!(store.root(), Path::new("/opt/gems"));
    }
}
