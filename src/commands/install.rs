//! `rgi install`: wires the configuration into the install use case and
//! renders the report.

use anyhow::Result;
use log::debug;
use std::io::{self, Write};
use std::sync::Arc;

use super::{EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_SUCCESS};
use crate::application::{InstallOptions, InstallUseCase};
use crate::config::{Config, RootOptions};
use crate::error::EngineError;
use crate::hooks::DocumentationHook;
use crate::report::InstallReport;
use crate::resolver::Resolver;
use crate::runtime::Runtime;
use crate::store::DirStore;

/// Everything `rgi install` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct InstallCommand {
    pub names: Vec<String>,
    pub options: InstallOptions,
    /// `--root` / `RGI_ROOT`
    pub root: Option<std::path::PathBuf>,
    /// `--source`, in order
    pub sources: Vec<String>,
    /// Run the documentation hook
    pub document: bool,
}

#[tracing::instrument(skip(runtime, command))]
pub async fn install<R: Runtime + 'static>(runtime: R, command: InstallCommand) -> Result<u8> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run(runtime, command, &mut stdout.lock(), &mut stderr.lock()).await
}

/// Run the install and write the outcome to `out` / `err`. Returns the
/// process exit code.
pub async fn run<R: Runtime + 'static>(
    runtime: R,
    command: InstallCommand,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<u8> {
    let roots = RootOptions {
        root: command.root.clone(),
        install_dir: command.options.install_dir.clone(),
        user_install: command.options.user_install,
    };

    // Usage errors must surface even when no root can be determined
    if let Err(e) = command.options.validate(&command.names) {
        writeln!(err, "ERROR:  {}", e)?;
        return Ok(EXIT_FAILURE);
    }

    let config = Config::new(runtime, &roots, command.sources)?;
    let mut registry = config.registry()?;
    let store = DirStore::new(Arc::clone(&config.runtime), config.root.clone());

    let mut use_case = InstallUseCase::new(&store, &mut registry, Resolver::default());
    if command.document {
        use_case = use_case.with_hook(Box::new(DocumentationHook::new(
            Arc::clone(&config.runtime),
            config.root.clone(),
        )));
    }

    match use_case.run(&command.names, &command.options).await {
        Ok(report) => {
            render(&report, out, err)?;
            Ok(exit_code(&report))
        }
        Err(e) => {
            debug!("Install aborted: {:?}", e);
            writeln!(err, "ERROR:  {}", e)?;
            Ok(EXIT_FAILURE)
        }
    }
}

/// 0 when everything resolved and installed, 2 when a name could not be
/// resolved, 1 for any other failure.
pub fn exit_code(report: &InstallReport) -> u8 {
    if !report.not_found.is_empty() {
        EXIT_NOT_FOUND
    } else if !report.failures.is_empty() {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

pub fn render(
    report: &InstallReport,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<()> {
    for notice in &report.source_notices {
        writeln!(err, "INFO:  {}", EngineError::from(notice))?;
    }
    for spec in &report.installed {
        writeln!(out, "Successfully installed {}", spec.full_name())?;
    }
    for name in &report.skipped {
        writeln!(out, "Skipping {}: already installed", name)?;
    }
    for failure in &report.hook_failures {
        writeln!(
            err,
            "WARNING:  {} hook failed for {}: {}",
            failure.hook, failure.spec, failure.reason
        )?;
    }
    for not_found in &report.not_found {
        writeln!(err, "ERROR:  {}", not_found.message())?;
        if let Some(hint) = not_found.hint() {
            writeln!(err, "ERROR:  {}", hint)?;
        }
    }
    for failure in &report.failures {
        writeln!(err, "ERROR:  {}", failure.error)?;
    }
    writeln!(out, "{}", report.summary())
}
