//! CLI command handlers.

mod install;

pub use install::{InstallCommand, exit_code, install, render, run};

pub const EXIT_SUCCESS: u8 = 0;
/// Command-line errors and per-package install failures
pub const EXIT_FAILURE: u8 = 1;
/// At least one requested name could not be resolved
pub const EXIT_NOT_FOUND: u8 = 2;
