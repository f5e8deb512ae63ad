use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use kompo_util::errors::KompoError;

/// Global user configuration loaded from `~/.kompo/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    /// Credentials keyed by repository name, applied when the manifest
    /// entry carries none.
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialEntry>,
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Never contact HTTP repositories.
    #[serde(default)]
    pub offline: bool,
    /// Maximum number of coordinates looked up concurrently.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            offline: false,
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    8
}

/// Publishing settings from `[publish]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// File repository used when `kompo publish` names no repository.
    #[serde(default = "default_local_repository", rename = "local-repository")]
    pub local_repository: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            local_repository: default_local_repository(),
        }
    }
}

fn default_local_repository() -> String {
    "~/.m2/repository".to_string()
}

/// Credential entry for a named repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl GlobalConfig {
    /// Load `~/.kompo/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        let path = Self::default_path();
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| KompoError::Generic {
            message: format!("Failed to read global config: {e}"),
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            KompoError::Generic {
                message: format!("Failed to parse global config: {e}"),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the kompo data directory (`~/.kompo/`).
pub fn dirs_path() -> PathBuf {
    kompo_util::fs::home_dir().join(".kompo")
}
