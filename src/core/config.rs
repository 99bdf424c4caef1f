// src/core/config.rs

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, CONFIG_PATH_ENV, DISABLE_PTY_ENV};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use thiserror::Error;

/// Failures while loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Could not read config file '{path}': {source}")]
    Io {
        /// The configuration file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for these settings.
    #[error("Failed to parse config file '{path}': {source}")]
    TomlParse {
        /// The configuration file.
        path: String,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },
    /// A path could not be expanded.
    #[error("Failed to expand config path '{path}': {message}")]
    Expand {
        /// The raw path.
        path: String,
        /// Why expansion failed.
        message: String,
    },
}

/// Settings of the process runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Attach children to a pseudo-terminal (ignored where PTYs are unsupported).
    #[serde(rename = "pty")]
    pub use_pty: bool,
    /// Directory every child process is started in. Defaults to ours.
    pub working_directory: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            use_pty: true,
            working_directory: None,
        }
    }
}

/// The on-disk configuration file.
///
/// ```toml
/// [runner]
/// pty = false
/// working_directory = "~/src/project"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// `[runner]` table.
    pub runner: RunnerConfig,
}

impl Settings {
    /// Parses settings from TOML text. `origin` only names the source in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = toml::from_str(content).map_err(|source| ConfigError::TomlParse {
            path: origin.to_string(),
            source,
        })?;
        if let Some(dir) = &settings.runner.working_directory {
            settings.runner.working_directory = Some(expand_path(&dir.to_string_lossy())?);
        }
        Ok(settings)
    }

    /// Loads the configuration file, then applies environment overrides.
    ///
    /// The file is `$RELAY_CONFIG` when set (it must then exist), otherwise
    /// `<config dir>/relay/config.toml` when present. No file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
        let path = match explicit {
            Some(raw) => Some(expand_path(&raw)?),
            None => dirs::config_dir()
                .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
                .filter(|path| path.is_file()),
        };

        let mut settings = match path {
            Some(path) => {
                log::debug!("Loading configuration from '{}'", path.display());
                let display = path.display().to_string();
                let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: display.clone(),
                    source,
                })?;
                Self::from_toml_str(&content, &display)?
            }
            None => {
                log::debug!("No configuration file found, using defaults.");
                Self::default()
            }
        };

        settings.apply_env_overrides(env::var(DISABLE_PTY_ENV).ok().as_deref());
        Ok(settings)
    }

    /// `RELAY_DISABLE_PTY=true` turns pseudo-terminals off whatever the file says.
    pub fn apply_env_overrides(&mut self, disable_pty: Option<&str>) {
        if disable_pty.is_some_and(|value| value.trim().eq_ignore_ascii_case("true")) {
            log::debug!("{} is set, pseudo-terminals disabled.", DISABLE_PTY_ENV);
            self.runner.use_pty = false;
        }
    }
}

/// Expands `~` and environment variables in a path.
pub fn expand_path(raw: &str) -> Result<PathBuf, ConfigError> {
    let expanded = shellexpand::full(raw).map_err(|e| ConfigError::Expand {
        path: raw.to_string(),
        message: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
