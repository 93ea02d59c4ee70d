//! Platform identification and compatibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build platform of a package.
///
/// `Ruby` is the generic platform and runs anywhere. A specific platform
/// (`x86_64-linux`) only matches itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    #[default]
    Ruby,
    Specific(String),
}

impl Platform {
    pub const GENERIC: &'static str = "ruby";

    /// Detect the platform this binary runs on, as `<arch>-<os>`.
    pub fn local() -> Self {
        Platform::Specific(format!("{}-{}", Self::detect_arch(), Self::detect_os()))
    }

    fn detect_os() -> String {
        #[cfg(target_os = "macos")]
        {
            "darwin".to_string()
        }
        #[cfg(target_os = "linux")]
        {
            "linux".to_string()
        }
        #[cfg(target_os = "windows")]
        {
            "mingw32".to_string()
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            std::env::consts::OS.to_string()
        }
    }

    fn detect_arch() -> String {
        #[cfg(target_arch = "x86_64")]
        {
            "x86_64".to_string()
        }
        #[cfg(target_arch = "aarch64")]
        {
            "arm64".to_string()
        }
        #[cfg(target_arch = "x86")]
        {
            "x86".to_string()
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "x86")))]
        {
            std::env::consts::ARCH.to_string()
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Platform::Ruby)
    }

    /// Whether a package built for `self` can be installed on `target`.
    pub fn matches(&self, target: &Platform) -> bool {
        match self {
            Platform::Ruby => true,
            Platform::Specific(_) => self == target,
        }
    }

    /// Tie-break rank: specific builds are preferred over generic ones.
    pub fn specificity(&self) -> u8 {
        match self {
            Platform::Ruby => 0,
            Platform::Specific(_) => 1,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == Self::GENERIC {
            Platform::Ruby
        } else {
            Platform::Specific(trimmed.to_string())
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        Platform::from(value.to_string())
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ruby => f.write_str(Self::GENERIC),
            Platform::Specific(name) => f.write_str(name),
        }
    }
}
