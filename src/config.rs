use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

/// Run configuration, loaded once and never mutated.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub token: String,
    pub folder_mapping: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub max_concurrent_folders: Option<usize>,
}

// Keeps the credential out of debug logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("folder_mapping", &self.folder_mapping)
            .field("max_concurrent_folders", &self.max_concurrent_folders)
            .finish()
    }
}

/// One folder and the channels its images are posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTask {
    pub folder: PathBuf,
    pub channels: Vec<String>,
}

impl Config {
    pub fn folder_tasks(&self) -> Vec<FolderTask> {
        self.folder_mapping
            .iter()
            .map(|(folder, channels)| FolderTask {
                folder: PathBuf::from(folder),
                channels: channels.clone(),
            })
            .collect()
    }
}

pub fn load_config(path: &Path) -> AppResult<Config> {
    let config_str = fs::read_to_string(path).map_err(|source| AppError::ConfigUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_config(path, &config_str)?;
    validate_config(&config)?;

    log::info!(
        "Loaded configuration from {} ({} folders)",
        path.display(),
        config.folder_mapping.len()
    );
    Ok(config)
}

fn parse_config(path: &Path, config_str: &str) -> AppResult<Config> {
    serde_json::from_str(config_str).map_err(|source| AppError::ConfigMalformed {
        path: path.to_path_buf(),
        source,
    })
}

pub fn validate_config(config: &Config) -> AppResult<()> {
    if config.token.trim().is_empty() {
        return Err(AppError::validation("token", "Must not be empty"));
    }

    if config.max_concurrent_folders == Some(0) {
        return Err(AppError::validation(
            "maxConcurrentFolders",
            "Must be at least 1",
        ));
    }

    for (folder, channels) in &config.folder_mapping {
        if folder.trim().is_empty() {
            return Err(AppError::validation(
                "folderMapping",
                "Folder paths must not be empty",
            ));
        }

        if channels.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::validation(
                "folderMapping",
                &format!("Empty channel id configured for {}", folder),
            ));
        }
    }

    Ok(())
}
