use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_VERSION: &str = "1.0.0";

/// Path to a JSON file holding a [`BridgeConfig`].
pub const CONFIG_ENV: &str = "RAW_BRIDGE_CONFIG";
/// Extra library search directories, in the platform's path-list syntax.
pub const LIBRARY_PATH_ENV: &str = "RAW_LIBRARY_PATH";

fn default_library() -> String {
    "raw".to_string()
}

fn default_symbol() -> String {
    "hello".to_string()
}

fn default_release_symbol() -> String {
    "raw_free_string".to_string()
}

/// Which library the bridge loads, which exports it calls, and where it
/// looks for the library before deferring to the platform loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(rename = "config-version")]
    pub config_version: String,
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(rename = "release-symbol", default = "default_release_symbol")]
    pub release_symbol: String,
    #[serde(rename = "search-paths", default)]
    pub search_paths: Vec<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION.to_string(),
            library: default_library(),
            symbol: default_symbol(),
            release_symbol: default_release_symbol(),
            search_paths: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn for_library(name: &str) -> Self {
        Self {
            library: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn from_str(s: &str) -> Result<Self> {
        let res: BridgeConfig = serde_json::from_str(s)?;
        if res.config_version != CONFIG_VERSION {
            return Err(anyhow!(
                "Unsupported config version: {}",
                res.config_version
            ));
        }

        Ok(res)
    }

    pub fn to_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading bridge config {}", path.display()))?;
        Self::from_str(&s).with_context(|| format!("parsing bridge config {}", path.display()))
    }

    /// Builds the configuration the process-global bridge uses: the file
    /// named by `RAW_BRIDGE_CONFIG` if set, else the defaults, followed by
    /// any directories from `RAW_LIBRARY_PATH`.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };

        if let Some(paths) = env::var_os(LIBRARY_PATH_ENV) {
            config
                .search_paths
                .extend(env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }

        Ok(config)
    }
}
