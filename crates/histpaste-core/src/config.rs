//! Configuration management for histpaste.
//!
//! Loads configuration from ${HISTPASTE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compose::DEFAULT_TERMINATOR;
use crate::sinks::ClipboardTransport;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for histpaste configuration and data directories.
    //!
    //! HISTPASTE_HOME resolution order:
    //! 1. HISTPASTE_HOME environment variable (if set)
    //! 2. ~/.config/histpaste (default)
    //! 3. ./.histpaste when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the histpaste home directory.
    pub fn histpaste_home() -> PathBuf {
        if let Ok(home) = std::env::var("HISTPASTE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".histpaste"),
            |h| h.join(".config").join("histpaste"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        histpaste_home().join("config.toml")
    }

    /// Returns the default session log path.
    pub fn session_log_path() -> PathBuf {
        histpaste_home().join("session.jsonl")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        histpaste_home().join("logs")
    }
}

/// GitHub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API base URL override
    pub base_url: Option<String>,
    /// Token override (takes precedence over GITHUB_TOKEN and `login`)
    pub token: Option<String>,
    /// Description attached to created gists
    pub description: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            description: Config::DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Clipboard settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    pub transport: ClipboardTransport,
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filename used when the content does not suggest one
    pub default_filename: String,
    /// Create public gists by default
    pub public: bool,
    /// Inputs ending with this character are not annotated with their result
    pub terminator: char,
    /// Evaluations kept when loading a session log (0 = unbounded)
    pub history_size: usize,
    /// Session log override
    pub session_log: Option<String>,
    pub github: GithubConfig,
    pub clipboard: ClipboardConfig,
}

impl Config {
    const DEFAULT_FILENAME: &str = "histpaste.txt";
    const DEFAULT_HISTORY_SIZE: usize = 1000;
    const DEFAULT_DESCRIPTION: &str = "Shared with histpaste";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
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

    /// Returns the session log to read history from.
    pub fn session_log_path(&self) -> PathBuf {
        match self.session_log.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => paths::session_log_path(),
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// This is used by `xtask update-default-config` to keep
    /// `default_config.toml` in sync with Rust default values.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    pub fn generate() -> Result<String> {
        use toml_edit::{DocumentMut, Item};

        fn merge(target: &mut toml_edit::Table, source: &toml_edit::Table) {
            for (key, value) in source.iter() {
                match value {
                    Item::Value(v) => {
                        if let Some(Item::Value(existing)) = target.get_mut(key) {
                            // Keep the template's comments around the value.
                            let decor = existing.decor().clone();
                            *existing = v.clone();
                            *existing.decor_mut() = decor;
                        } else {
                            target[key] = Item::Value(v.clone());
                        }
                    }
                    Item::Table(src_table) => {
                        if let Some(Item::Table(target_table)) = target.get_mut(key) {
                            merge(target_table, src_table);
                        } else {
                            target[key] = Item::Table(src_table.clone());
                        }
                    }
                    Item::ArrayOfTables(arr) => {
                        target[key] = Item::ArrayOfTables(arr.clone());
                    }
                    Item::None => {}
                }
            }
        }

        let config = Config::default();
        let generated_toml =
            toml::to_string(&config).context("Failed to serialize default config to TOML")?;

        // Parse template as base (preserves comments)
        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;

        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge(doc.as_table_mut(), generated_doc.as_table());

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

impl Default for Config {
    fn default() -> Self {
        Self {
            default_filename: Self::DEFAULT_FILENAME.to_string(),
            public: false,
            terminator: DEFAULT_TERMINATOR,
            history_size: Self::DEFAULT_HISTORY_SIZE,
            session_log: None,
            github: GithubConfig::default(),
            clipboard: ClipboardConfig::default(),
        }
    }
}
