//! Console configuration.
//!
//! Sources, highest precedence first: the `--url` flag, the
//! `DFQ_SERVICE_URL` environment variable (both handled by clap), a
//! `dfq.toml` in the working directory, then built-in defaults.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::ast::DEFAULT_FRAME;
use crate::error::{ConsoleError, ConsoleResult};

/// Service address used when nothing else is configured.
pub const DEFAULT_URL: &str = "http://localhost:3000";

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "dfq.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DfqConfig {
    pub service: ServiceConfig,
    pub console: ConsoleConfig,
}

/// `[service]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Data service base URL
    pub url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// `[console]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Frame name that loads are stored under
    pub dataframe: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            dataframe: DEFAULT_FRAME.to_string(),
        }
    }
}

impl DfqConfig {
    /// Read `dfq.toml` from the working directory; defaults when the
    /// file does not exist.
    pub fn load() -> ConsoleResult<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> ConsoleResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ConsoleError::config(format!("{}: {}", path.display(), e)))
    }

    /// Apply a URL override from the command line or environment.
    pub fn with_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.service.url = url;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}
