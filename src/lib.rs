pub mod application;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod hooks;
pub mod http;
pub mod install;
pub mod package;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod runtime;
pub mod source;
pub mod store;
pub mod version;
