//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "dbFile": "card.s3db" }
//! }
//! ```
//! Fields Cardbank does not manage are kept and written back untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Database file used when nothing else is configured
pub const DEFAULT_DB_FILE: &str = "card.s3db";

/// Environment variable overriding the database file name
pub const DB_FILE_ENV: &str = "CARDBANK_DB_FILE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_file: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Cardbank configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database file name, relative to the data directory unless absolute
    pub db_file: String,
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_file: DEFAULT_DB_FILE.to_string(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// `CARDBANK_DB_FILE` overrides the file name from settings.json.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("{}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        let db_file = std::env::var(DB_FILE_ENV)
            .ok()
            .filter(|f| !f.trim().is_empty())
            .or_else(|| raw.app.db_file.clone())
            .unwrap_or_else(|| DEFAULT_DB_FILE.to_string());

        Ok(Self {
            db_file,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory, preserving unmanaged settings
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).map_err(|e| {
                Error::Config(format!("{}: {}", settings_path.display(), e))
            })?
        } else {
            self._raw_settings.clone()
        };

        settings.app.db_file = Some(self.db_file.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Apply a command line file name override
    ///
    /// Names shorter than two characters are ignored.
    pub fn override_db_file(&mut self, file_name: Option<&str>) {
        if let Some(name) = file_name.filter(|n| n.chars().count() > 1) {
            self.db_file = name.to_string();
        }
    }

    /// Set the database file name to be saved in settings.json
    pub fn set_db_file(&mut self, file_name: &str) -> Result<()> {
        if file_name.chars().count() < 2 {
            return Err(Error::Config(format!(
                "database file name '{}' must be at least 2 characters",
                file_name
            )));
        }
        self.db_file = file_name.to_string();
        Ok(())
    }

    /// Full path of the database file
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.db_file)
    }
}
