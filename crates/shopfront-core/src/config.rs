//! Configuration management for Shopfront.
//!
//! Loads configuration from ${SHOPFRONT_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "SHOPFRONT_API_URL";

/// Where catalog data is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// The storefront API (server-side search, filtering and paging).
    #[default]
    Remote,
    /// Built-in sample catalog, filtered and sorted client-side.
    Demo,
}

impl CatalogSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogSource::Remote => "remote",
            CatalogSource::Demo => "demo",
        }
    }
}

/// API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the `/api` prefix.
    pub base_url: String,
    /// Connect timeout in seconds (0 leaves it to the transport).
    pub connect_timeout_secs: u32,
    /// Command-line `--api-url`; wins over the environment.
    #[serde(skip)]
    pub base_url_override: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: Config::DEFAULT_CONNECT_TIMEOUT_SECS,
            base_url_override: None,
        }
    }
}

/// Catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub featured_limit: u32,
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::Remote,
            featured_limit: 8,
            page_size: 20,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `SHOPFRONT_LOG` is unset.
    pub level: String,
    /// Optional explicit log file; defaults to a rolling file under `logs/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly or run `cargo xtask`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Shopfront configuration and data directories.
    //!
    //! SHOPFRONT_HOME resolution order:
    //! 1. SHOPFRONT_HOME environment variable (if set)
    //! 2. ~/.config/shopfront (default)

    use std::path::PathBuf;

    /// Returns the Shopfront home directory.
    pub fn shopfront_home() -> PathBuf {
        if let Ok(home) = std::env::var("SHOPFRONT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".shopfront"),
            |h| h.join(".config").join("shopfront"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        shopfront_home().join("config.toml")
    }

    /// Returns the path of the persistent key/value store (session + local cart).
    pub fn storage_path() -> PathBuf {
        shopfront_home().join("storage.json")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        shopfront_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
    const DEFAULT_CONNECT_TIMEOUT_SECS: u32 = 10;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the API base URL with precedence:
    /// command line > env > config > default.
    ///
    /// Trailing slashes are stripped so endpoints can be appended verbatim.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn effective_base_url(&self) -> Result<String> {
        let from_env = std::env::var(API_URL_ENV).ok();
        let candidates = [
            self.api.base_url_override.as_deref(),
            from_env.as_deref(),
            Some(self.api.base_url.as_str()),
        ];

        let chosen = candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(Self::DEFAULT_BASE_URL);

        url::Url::parse(chosen).with_context(|| format!("Invalid API base URL: {chosen}"))?;
        Ok(chosen.trim_end_matches('/').to_string())
    }

    /// Connect timeout, or `None` when disabled.
    pub fn connect_timeout(&self) -> Option<Duration> {
        if self.api.connect_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.api.connect_timeout_secs)))
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let config = Config::default();
        let generated_toml =
            toml::to_string(&config).context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;

        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}
