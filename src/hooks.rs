//! Post-install hooks.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::package::Spec;
use crate::runtime::Runtime;
use crate::store::{DOC_DIR, GEMS_DIR};

/// Called once for every spec committed during a run, in install order.
#[cfg_attr(test, mockall::automock)]
pub trait PostInstallHook: Send + Sync {
    fn name(&self) -> &str;
    fn on_installed(&self, spec: &Spec) -> Result<()>;
}

/// A hook that failed for one spec. The install itself stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub hook: String,
    pub spec: String,
    pub reason: String,
}

/// Run every hook for every spec, collecting failures instead of raising them.
pub fn run_hooks(hooks: &[Box<dyn PostInstallHook>], specs: &[Spec]) -> Vec<HookFailure> {
    let mut failures = Vec::new();
    for spec in specs {
        for hook in hooks {
            debug!("Running {} hook for {}", hook.name(), spec.full_name());
            if let Err(e) = hook.on_installed(spec) {
                warn!("{} hook failed for {}: {:#}", hook.name(), spec.full_name(), e);
                failures.push(HookFailure {
                    hook: hook.name().to_string(),
                    spec: spec.full_name(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }
    failures
}

/// Writes `<root>/doc/<full_name>/files.txt`, the sorted list of files
/// installed for the spec.
pub struct DocumentationHook<R: Runtime> {
    runtime: Arc<R>,
    root: PathBuf,
}

impl<R: Runtime> DocumentationHook<R> {
    pub const INDEX_FILE: &'static str = "files.txt";

    pub fn new(runtime: Arc<R>, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    fn collect(&self, base: &Path, dir: &Path, files: &mut Vec<String>) -> Result<()> {
        for path in self.runtime.read_dir(dir)? {
            if self.runtime.is_dir(&path) {
                self.collect(base, &path, files)?;
            } else if let Ok(relative) = path.strip_prefix(base) {
                files.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }
}

impl<R: Runtime> PostInstallHook for DocumentationHook<R> {
    fn name(&self) -> &str {
        "documentation"
    }

    #[tracing::instrument(skip(self, spec), fields(spec = %spec.full_name()))]
    fn on_installed(&self, spec: &Spec) -> Result<()> {
        let full_name = spec.full_name();
        let gem_dir = self.root.join(GEMS_DIR).join(&full_name);
        let doc_dir = self.root.join(DOC_DIR).join(&full_name);

        let mut files = Vec::new();
        self.collect(&gem_dir, &gem_dir, &mut files)
            .with_context(|| format!("Failed to list files of {}", full_name))?;
        files.sort();

        let mut index = files.join("\n");
        index.push('\n');
        self.runtime.create_dir_all(&doc_dir)?;
        self.runtime
            .write(&doc_dir.join(Self::INDEX_FILE), index.as_bytes())
            .with_context(|| format!("Failed to write documentation for {}", full_name))?;
        debug!("Documented {} files for {}", files.len(), full_name);
        Ok(())
    }
}
