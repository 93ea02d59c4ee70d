//! Application layer - Use cases that coordinate the engine.
//!
//! This layer orchestrates the flow of data between the CLI layer and the
//! resolver, fetcher, store and hooks.

mod install;

pub use install::{InstallOptions, InstallUseCase};
