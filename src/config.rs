//! Run configuration: store root, sources and the shared HTTP client.

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::runtime::Runtime;
use crate::source::{LocalSource, RemoteSource, SourceRegistry};

pub const TOKEN_VAR: &str = "RGI_TOKEN";
pub const HOME_VAR: &str = "RGI_HOME";
pub const SOURCES_VAR: &str = "RGI_SOURCES";

const USER_AGENT: &str = "rgi-cli";
const USER_DIR: &str = ".rgi";
const DATA_SUBDIR: &str = "rgi";

/// Where the store lives, as selected on the command line.
#[derive(Debug, Clone, Default)]
pub struct RootOptions {
    /// `--root` / `RGI_ROOT`
    pub root: Option<PathBuf>,
    /// `--install-dir`
    pub install_dir: Option<PathBuf>,
    /// `--user-install`
    pub user_install: bool,
}

pub struct Config<R: Runtime> {
    pub runtime: Arc<R>,
    pub client: Client,
    pub root: PathBuf,
    /// Remote source URLs, in registration order
    pub sources: Vec<String>,
}

impl<R: Runtime + 'static> Config<R> {
    pub fn new(runtime: R, roots: &RootOptions, sources: Vec<String>) -> Result<Self> {
        let root = store_root(&runtime, roots)?;
        info!("Using store root: {}", root.display());

        let sources = if sources.is_empty() {
            env_sources(&runtime)
        } else {
            sources
        };

        let client = build_client(&runtime)?;
        Ok(Self {
            runtime: Arc::new(runtime),
            client,
            root,
            sources,
        })
    }

    /// The current directory as the local source, followed by the remote
    /// sources in order.
    #[tracing::instrument(skip(self))]
    pub fn registry(&self) -> Result<SourceRegistry> {
        let mut registry = SourceRegistry::new();
        let cwd = self.runtime.current_dir()?;
        registry.add(Arc::new(LocalSource::new(Arc::clone(&self.runtime), cwd)));
        for url in &self.sources {
            registry.add(Arc::new(RemoteSource::new(self.client.clone(), url)));
        }
        Ok(registry)
    }
}

/// Store root, by precedence: `--install-dir`, `--user-install`, `--root`,
/// `RGI_HOME`, then `<data dir>/rgi`.
#[tracing::instrument(skip(runtime))]
pub fn store_root<R: Runtime + ?Sized>(runtime: &R, roots: &RootOptions) -> Result<PathBuf> {
    if let Some(dir) = &roots.install_dir {
        return Ok(dir.clone());
    }
    if roots.user_install {
        let home = runtime
            .home_dir()
            .context("Could not find home directory")?;
        return Ok(home.join(USER_DIR));
    }
    if let Some(root) = &roots.root {
        return Ok(root.clone());
    }
    if let Ok(home) = runtime.env_var(HOME_VAR)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }
    let data = runtime
        .data_dir()
        .context("Could not find a data directory")?;
    Ok(data.join(DATA_SUBDIR))
}

fn env_sources<R: Runtime + ?Sized>(runtime: &R) -> Vec<String> {
    runtime
        .env_var(SOURCES_VAR)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

/// Shared client for every remote source. `RGI_TOKEN`, when set, is sent as a
/// bearer token.
pub fn build_client<R: Runtime + ?Sized>(runtime: &R) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Ok(token) = runtime.env_var(TOKEN_VAR) {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("RGI_TOKEN is not a valid header value")?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("Using {} for authentication: {}", TOKEN_VAR, mask(&token));
    }

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}
