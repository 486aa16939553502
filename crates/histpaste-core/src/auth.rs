//! Paste service token storage.
//!
//! Stores tokens in `<base>/auth.json` with restricted permissions (0600).
//! Tokens are never logged or displayed in full.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Token cache filename.
const AUTH_FILE: &str = "auth.json";

/// Key of the GitHub token in the store.
pub const GITHUB_KEY: &str = "github";

/// A saved token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedToken {
    pub token: String,
    /// Account the token belongs to, as reported at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// RFC 3339 timestamp of when the token was saved.
    pub saved_at: String,
}

impl SavedToken {
    pub fn new(token: String, login: Option<String>) -> Self {
        Self {
            token,
            login,
            saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Token cache structure.
/// Maps service names to their tokens.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenStore {
    #[serde(flatten)]
    services: HashMap<String, SavedToken>,
}

impl TokenStore {
    /// Returns the path to the token cache file.
    pub fn path() -> PathBuf {
        paths::histpaste_home().join(AUTH_FILE)
    }

    /// Loads the store from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Loads the store from a specific path.
    /// Returns an empty store if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token store from {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token store from {}", path.display()))
    }

    /// Saves the store to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Saves the store with restricted permissions (0600).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize token store")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    pub fn get(&self, service: &str) -> Option<&SavedToken> {
        self.services.get(service)
    }

    pub fn set(&mut self, service: &str, token: SavedToken) {
        self.services.insert(service.to_string(), token);
    }

    pub fn remove(&mut self, service: &str) -> Option<SavedToken> {
        self.services.remove(service)
    }
}

/// Masks a token for display: keeps a short prefix only.
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 || !token.is_char_boundary(8) {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}
