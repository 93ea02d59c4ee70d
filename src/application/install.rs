//! Install use case - orchestrates the resolution and installation flow.
//!
//! This use case coordinates:
//! - Option validation and the store permission check
//! - Resolution of every requested name, in the order given
//! - Conservative skipping of already satisfied requests
//! - Dependency-first pull-in, fetch and commit
//! - Post-install hooks and the final report

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::error::EngineError;
use crate::fetcher;
use crate::hooks::{PostInstallHook, run_hooks};
use crate::install::{self, InstalledSet, already_satisfied};
use crate::package::{Candidate, Spec};
use crate::report::{InstallReport, NotFound, PackageFailure};
use crate::resolver::{Request, Resolver};
use crate::source::{Domain, SourceRegistry};
use crate::store::PackageStore;
use crate::version::{Requirement, Version};

/// Options for the install use case
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Which kinds of sources to resolve against
    pub domain: Domain,
    /// Allow installing pre-release versions
    pub prerelease: bool,
    /// Explicit constraint for the single requested name
    pub version: Option<Requirement>,
    /// Skip names an installed spec already satisfies
    pub conservative: bool,
    pub ignore_dependencies: bool,
    pub install_dir: Option<PathBuf>,
    pub user_install: bool,
}

impl InstallOptions {
    /// Usage checks, run before any resolution.
    pub fn validate(&self, names: &[String]) -> Result<(), EngineError> {
        if self.install_dir.is_some() && self.user_install {
            return Err(EngineError::ConflictingOptions(
                "Use --install-dir or --user-install but not both".to_string(),
            ));
        }
        if self.version.is_some() && names.len() > 1 {
            return Err(EngineError::ConflictingOptions(
                "Can't use --version with multiple gems".to_string(),
            ));
        }
        if names.is_empty() {
            return Err(EngineError::NoPackagesRequested);
        }
        Ok(())
    }

    pub fn requirement(&self) -> Requirement {
        self.version.clone().unwrap_or_default()
    }
}

/// One unit of the dependency-first pull-in.
enum Step {
    /// Resolve a request; `parent` is the full name of the spec that depends
    /// on it, `None` for the requested name itself.
    Resolve {
        request: Request,
        parent: Option<String>,
    },
    Commit {
        candidate: Candidate,
        parent: Option<String>,
    },
}

/// Install use case
pub struct InstallUseCase<'a, S: PackageStore + ?Sized> {
    store: &'a S,
    registry: &'a mut SourceRegistry,
    resolver: Resolver,
    hooks: Vec<Box<dyn PostInstallHook>>,
}

impl<'a, S: PackageStore + ?Sized> InstallUseCase<'a, S> {
    pub fn new(store: &'a S, registry: &'a mut SourceRegistry, resolver: Resolver) -> Self {
        Self {
            store,
            registry,
            resolver,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: Box<dyn PostInstallHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Install every name in `names`, in order.
    ///
    /// Usage errors and an unwritable store abort the run; everything else is
    /// recorded per name in the returned report.
    #[tracing::instrument(skip(self, options))]
    pub async fn run(
        &mut self,
        names: &[String],
        options: &InstallOptions,
    ) -> Result<InstallReport, EngineError> {
        options.validate(names)?;

        if !self.store.is_writable() {
            return Err(EngineError::PermissionDenied {
                path: self.store.root().to_path_buf(),
            });
        }

        let installed = self.store.list_installed().unwrap_or_else(|e| {
            warn!("Unable to list installed gems: {:#}", e);
            Vec::new()
        });
        debug!("{} gems already installed", installed.len());

        let mut tracker = InstalledSet::new();
        let mut report = InstallReport::default();

        for name in names {
            let request = Request::new(name.as_str(), options.requirement())
                .with_prerelease(options.prerelease);

            if options.conservative {
                let satisfied = already_satisfied(&installed, &request)
                    .or_else(|| already_satisfied(tracker.specs(), &request));
                if let Some(spec) = satisfied {
                    info!("Skipping {}: {} already installed", request, spec.full_name());
                    report.skipped.push(name.clone());
                    continue;
                }
            }

            match self.install_request(request, options, &installed, &mut tracker).await {
                Ok(()) => {}
                Err(EngineError::ConstraintUnsatisfiable {
                    name,
                    requirement,
                    suggestions,
                }) => report.not_found.push(NotFound {
                    name,
                    requirement,
                    suggestions,
                }),
                Err(error) => {
                    warn!("{}", error);
                    report.failures.push(PackageFailure {
                        name: name.clone(),
                        error,
                    });
                }
            }
        }

        report.installed = tracker.into_specs();
        report.source_notices = self.registry.notices().to_vec();
        report.hook_failures = run_hooks(&self.hooks, &report.installed);
        Ok(report)
    }

    /// Resolve and install one requested name, pulling in its dependencies
    /// first. A failing dependency fails the request.
    async fn install_request(
        &mut self,
        request: Request,
        options: &InstallOptions,
        installed: &[Spec],
        tracker: &mut InstalledSet,
    ) -> Result<(), EngineError> {
        // Names on the current ancestor chain, with the version chosen for each
        let mut pending: HashMap<String, Version> = HashMap::new();
        let mut stack = vec![Step::Resolve {
            request,
            parent: None,
        }];

        while let Some(step) = stack.pop() {
            match step {
                Step::Resolve { request, parent } => {
                    if let Some(dependent) = &parent {
                        let satisfied = already_satisfied(installed, &request)
                            .or_else(|| already_satisfied(tracker.specs(), &request));
                        if let Some(spec) = satisfied {
                            debug!("Dependency {} satisfied by {}", request, spec.full_name());
                            continue;
                        }
                        if let Some(version) = pending.get(&request.name) {
                            if request.requirement.satisfied_by(version) {
                                debug!("Dependency cycle on {}, cut", request.name);
                                continue;
                            }
                            warn!(
                                "{} requires {}, but {} {} is already being installed",
                                dependent, request, request.name, version
                            );
                            return Err(EngineError::DependencyFailed {
                                name: dependent.clone(),
                                dependency: request.to_string(),
                            });
                        }
                    }

                    let resolution = self
                        .resolver
                        .resolve(self.registry, options.domain, &request, installed)
                        .await;
                    let candidate = match (resolution.into_result(), &parent) {
                        (Ok(candidate), _) => candidate,
                        (Err(e), None) => return Err(e),
                        (Err(e), Some(dependent)) => {
                            warn!("{}", e);
                            return Err(EngineError::DependencyFailed {
                                name: dependent.clone(),
                                dependency: request.to_string(),
                            });
                        }
                    };

                    if tracker.contains(&candidate.full_name()) {
                        debug!("{} already installed in this run", candidate.full_name());
                        continue;
                    }

                    pending.insert(candidate.name.clone(), candidate.version.clone());
                    let dependencies = if options.ignore_dependencies {
                        Vec::new()
                    } else {
                        candidate.dependencies.clone()
                    };
                    let full_name = candidate.full_name();
                    stack.push(Step::Commit { candidate, parent });
                    for dependency in dependencies.into_iter().rev() {
                        stack.push(Step::Resolve {
                            request: Request::new(dependency.name, dependency.requirement),
                            parent: Some(full_name.clone()),
                        });
                    }
                }
                Step::Commit { candidate, parent } => {
                    pending.remove(&candidate.name);
                    let result = self.commit(&candidate).await;
                    match (result, parent) {
                        (Ok(spec), _) => {
                            tracker.insert(spec);
                        }
                        (Err(e), None) => return Err(e),
                        (Err(e), Some(dependent)) => {
                            warn!("{}", e);
                            return Err(EngineError::DependencyFailed {
                                name: dependent,
                                dependency: candidate.full_name(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn commit(&self, candidate: &Candidate) -> Result<Spec, EngineError> {
        let bytes = fetcher::fetch(&*self.registry, candidate).await?;
        install::commit(self.store, candidate, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::MockPostInstallHook;
    use crate::package::Dependency;
    use crate::runtime::RealRuntime;
    use crate::store::{DirStore, MockPackageStore};
    use crate::test_utils::{StaticSource, gem};
    use crate::source::SourceKind;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn resolver() -> Resolver {
        Resolver::new(crate::platform::Platform::from("x86_64-linux"))
    }

    fn store(root: &Path) -> DirStore<RealRuntime> {
        DirStore::new(Arc::new(RealRuntime), root.to_path_buf())
    }

    #[test]
    fn test_validate_options() {
        let options = InstallOptions {
            install_dir: Some(PathBuf::from("/tmp/gems")),
            user_install: true,
            ..Default::default()
        };
        let err = options.validate(&names(&["a"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Use --install-dir or --user-install but not both"
        );

        let options = InstallOptions {
            version: Some(Requirement::parse("1").unwrap()),
            ..Default::default()
        };
        let err = options.validate(&names(&["a", "b"])).unwrap_err();
        assert_eq!(err.to_string(), "Can't use --version with multiple gems");
        assert!(options.validate(&names(&["a"])).is_ok());

        let err = InstallOptions::default().validate(&[]).unwrap_err();
        assert!(matches!(err, EngineError::NoPackagesRequested));
    }

    #[tokio::test]
    async fn test_usage_error_before_any_resolution() {
        let mut store = MockPackageStore::new();
        store.expect_is_writable().never();
        let mut registry = SourceRegistry::new();
        let source = StaticSource::remote("https://gems.example.com", vec![gem("a", "2", &[])]);
        let calls = source.index_calls();
        registry.add(Arc::new(source));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let err = use_case
            .run(&[], &InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NoPackagesRequested));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_permission_denied_before_fetch() {
        // --- Setup ---
        let mut store = MockPackageStore::new();
        store.expect_is_writable().return_const(false);
        store
            .expect_root()
            .return_const(PathBuf::from("/opt/gems"));
        store.expect_write().never();

        let source = StaticSource::remote("https://gems.example.com", vec![gem("a", "2", &[])]);
        let fetches = source.fetch_calls();
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(source));

        // --- Execute ---
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let err = use_case
            .run(&names(&["a"]), &InstallOptions::default())
            .await
            .unwrap_err();

        // --- Verify ---
        assert_eq!(
            err.to_string(),
            "You don't have write permissions for the /opt/gems directory."
        );
        assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_request_skips_prerelease_across_sources() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://one.example.com",
            vec![gem("a", "2", &[])],
        )));
        registry.add(Arc::new(StaticSource::remote(
            "https://two.example.com",
            vec![gem("a", "2.a", &[])],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a"]), &InstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.full_names(), vec!["a-2"]);
        assert_eq!(report.summary(), "1 gem installed");
        assert!(dir.path().join("gems/a-2").is_dir());
    }

    #[tokio::test]
    async fn test_explicit_prerelease_version() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[]), gem("a", "2.a", &[])],
        )));

        let options = InstallOptions {
            version: Some(Requirement::parse("2.a").unwrap()),
            ..Default::default()
        };
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case.run(&names(&["a"]), &options).await.unwrap();

        assert_eq!(report.full_names(), vec!["a-2.a"]);
    }

    #[tokio::test]
    async fn test_not_found_carries_suggestion() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("non_existent_with_hint", "1", &[])],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["nonexistent_with_hint"]), &InstallOptions::default())
            .await
            .unwrap();

        assert!(report.installed.is_empty());
        assert_eq!(report.not_found.len(), 1);
        assert_eq!(
            report.not_found[0].suggestions,
            vec!["non_existent_with_hint".to_string()]
        );
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_conservative_skips_satisfied_name() {
        // --- Setup ---
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let b1 = gem("b", "1", &[]);
        store.write(&b1.spec(), &b1.bytes).unwrap();

        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[]), gem("b", "2", &[])],
        )));

        // --- Execute ---
        let options = InstallOptions {
            conservative: true,
            ..Default::default()
        };
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case.run(&names(&["a", "b"]), &options).await.unwrap();

        // --- Verify ---
        assert_eq!(report.full_names(), vec!["a-2"]);
        assert_eq!(report.skipped, vec!["b".to_string()]);
        assert_eq!(report.summary(), "1 gem installed");
        assert!(!dir.path().join("gems/b-2").exists());
    }

    #[tokio::test]
    async fn test_non_conservative_installs_newer_version() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let b1 = gem("b", "1", &[]);
        store.write(&b1.spec(), &b1.bytes).unwrap();

        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("b", "2", &[])],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["b"]), &InstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.full_names(), vec!["b-2"]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_failed_source_does_not_block_install() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::unreachable(
            "https://down.example.com",
        )));
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[])],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a"]), &InstallOptions::default())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.full_names(), vec!["a-2"]);
        assert_eq!(report.source_notices.len(), 1);
        assert_eq!(report.source_notices[0].location, "https://down.example.com");
    }

    #[tokio::test]
    async fn test_dependencies_installed_first() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![
                gem("a", "2", &[("b", ">= 1"), ("c", ">= 0")]),
                gem("b", "1", &[("c", ">= 0")]),
                gem("c", "1", &[("a", ">= 0")]),
            ],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a"]), &InstallOptions::default())
            .await
            .unwrap();

        // c depends back on a, the cycle is cut
        assert_eq!(report.full_names(), vec!["c-1", "b-1", "a-2"]);
    }

    #[tokio::test]
    async fn test_diamond_with_conflicting_constraints_installs_both_versions() {
        // --- Setup ---
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![
                gem("a", "1", &[("b", "< 2"), ("c", ">= 0")]),
                gem("b", "1", &[]),
                gem("b", "2", &[]),
                gem("c", "1", &[("b", ">= 2")]),
            ],
        )));

        // --- Execute ---
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a"]), &InstallOptions::default())
            .await
            .unwrap();

        // --- Verify ---
        // c's requirement is not waved through by the earlier b-1 install
        assert!(report.is_success());
        assert_eq!(report.full_names(), vec!["b-1", "b-2", "c-1", "a-1"]);
        assert!(dir.path().join("gems/b-2").is_dir());
    }

    #[tokio::test]
    async fn test_cycle_with_conflicting_constraint_fails() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![
                gem("a", "1", &[]),
                gem("a", "2", &[("b", ">= 0")]),
                gem("b", "1", &[("a", "< 2")]),
            ],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a"]), &InstallOptions::default())
            .await
            .unwrap();

        assert!(report.installed.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "a");
        assert_eq!(
            report.failures[0].error.to_string(),
            "Error installing b-1: dependency a (< 2) could not be installed"
        );
        assert!(!dir.path().join("gems/a-2").exists());
    }

    #[tokio::test]
    async fn test_conservative_sees_dependency_installed_earlier_in_run() {
        // --- Setup ---
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let source = StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[("b", ">= 1")]), gem("b", "2", &[])],
        );
        let fetches = source.fetch_calls();
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(source));

        // --- Execute ---
        let options = InstallOptions {
            conservative: true,
            ..Default::default()
        };
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case.run(&names(&["a", "b"]), &options).await.unwrap();

        // --- Verify ---
        assert_eq!(report.full_names(), vec!["b-2", "a-2"]);
        assert_eq!(report.skipped, vec!["b".to_string()]);
        assert_eq!(report.summary(), "2 gems installed");
        // a and b, each once
        assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ignore_dependencies() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[("b", ">= 1")]), gem("b", "1", &[])],
        )));

        let options = InstallOptions {
            ignore_dependencies: true,
            ..Default::default()
        };
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case.run(&names(&["a"]), &options).await.unwrap();

        assert_eq!(report.full_names(), vec!["a-2"]);
    }

    #[tokio::test]
    async fn test_missing_dependency_fails_dependent() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[("missing", ">= 1")]), gem("b", "1", &[])],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a", "b"]), &InstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.full_names(), vec!["b-1"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "a");
        assert_eq!(
            report.failures[0].error.to_string(),
            "Error installing a-2: dependency missing (>= 1) could not be installed"
        );
        assert!(!dir.path().join("gems/a-2").exists());
    }

    #[tokio::test]
    async fn test_duplicate_names_installed_once() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let source = StaticSource::remote("https://gems.example.com", vec![gem("a", "2", &[])]);
        let fetches = source.fetch_calls();
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(source));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a", "a"]), &InstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.full_names(), vec!["a-2"]);
        assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_integrity_failure_is_per_package() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut bad = gem("a", "2", &[]);
        bad.entry.sha256 = Some("00".repeat(32));
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![bad, gem("b", "1", &[])],
        )));

        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case
            .run(&names(&["a", "b"]), &InstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.full_names(), vec!["b-1"]);
        assert!(matches!(
            report.failures[0].error,
            EngineError::FetchIntegrityMismatch { .. }
        ));
    }

    #[tokio::test]
    async fn test_local_domain_ignores_remote_sources() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let remote = StaticSource::remote("https://gems.example.com", vec![gem("a", "3", &[])]);
        let remote_calls = remote.index_calls();
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::new(
            SourceKind::Local,
            "/work",
            vec![gem("a", "2", &[])],
        )));
        registry.add(Arc::new(remote));

        let options = InstallOptions {
            domain: Domain::Local,
            ..Default::default()
        };
        let mut use_case = InstallUseCase::new(&store, &mut registry, resolver());
        let report = use_case.run(&names(&["a"]), &options).await.unwrap();

        assert_eq!(report.full_names(), vec!["a-2"]);
        assert_eq!(remote_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hooks_run_in_install_order_and_failures_are_reported() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let mut registry = SourceRegistry::new();
        registry.add(Arc::new(StaticSource::remote(
            "https://gems.example.com",
            vec![gem("a", "2", &[]), gem("b", "2", &[])],
        )));

        let mut hook = MockPostInstallHook::new();
        hook.expect_name().return_const("documentation".to_string());
        let mut seq = mockall::Sequence::new();
        hook.expect_on_installed()
            .withf(|s| s.name == "b")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("no space left")));
        hook.expect_on_installed()
            .withf(|s| s.name == "a")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut use_case =
            InstallUseCase::new(&store, &mut registry, resolver()).with_hook(Box::new(hook));
        let report = use_case
            .run(&names(&["b", "a"]), &InstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.full_names(), vec!["b-2", "a-2"]);
        assert!(report.is_success());
        assert_eq!(report.hook_failures.len(), 1);
        assert_eq!(report.hook_failures[0].spec, "b-2");
        // The install stands
        assert!(dir.path().join("specifications/b-2.json").exists());
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency {
            name: "b".to_string(),
            requirement: Requirement::parse(">= 1").unwrap(),
        };
        let request = Request::new(dep.name.clone(), dep.requirement.clone());
        assert_eq!(request.to_string(), "b (>= 1)");
    }
}
