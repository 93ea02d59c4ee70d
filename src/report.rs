//! Structured result of an install run.

use crate::error::EngineError;
use crate::hooks::HookFailure;
use crate::install;
use crate::package::Spec;
use crate::source::SourceNotice;
use crate::version::Requirement;

/// A requested name no source could satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct NotFound {
    pub name: String,
    pub requirement: Requirement,
    pub suggestions: Vec<String>,
}

impl NotFound {
    pub fn message(&self) -> String {
        format!(
            "Could not find a valid gem '{}' ({}) in any repository",
            self.name, self.requirement
        )
    }

    /// `Possible alternatives: a, b`, when there are any.
    pub fn hint(&self) -> Option<String> {
        if self.suggestions.is_empty() {
            None
        } else {
            Some(format!(
                "Possible alternatives: {}",
                self.suggestions.join(", ")
            ))
        }
    }
}

/// A requested name that resolved but could not be installed.
#[derive(Debug)]
pub struct PackageFailure {
    pub name: String,
    pub error: EngineError,
}

#[derive(Debug, Default)]
pub struct InstallReport {
    /// Newly installed specs, in install order
    pub installed: Vec<Spec>,
    /// Requested names skipped because an installed spec already satisfies them
    pub skipped: Vec<String>,
    pub not_found: Vec<NotFound>,
    pub failures: Vec<PackageFailure>,
    pub source_notices: Vec<SourceNotice>,
    pub hook_failures: Vec<HookFailure>,
}

impl InstallReport {
    pub fn summary(&self) -> String {
        install::summary(self.installed.len())
    }

    pub fn full_names(&self) -> Vec<String> {
        self.installed.iter().map(Spec::full_name).collect()
    }

    pub fn is_success(&self) -> bool {
        self.not_found.is_empty() && self.failures.is_empty()
    }
}
