use fs_err::read_to_string;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ConfigError;

pub const DEFAULT_SETTINGS_PATH: &str = "oyster.toml";
pub const DEFAULT_DATABASE_PATH: &str = "oyster.db";
pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

pub const PROJECT_ID_VAR: &str = "GCP_PROJECT_ID";
pub const TOPIC_VAR: &str = "GCP_PUBSUB_TOPIC";
pub const ACCESS_TOKEN_VAR: &str = "GCP_ACCESS_TOKEN";
pub const EMULATOR_HOST_VAR: &str = "PUBSUB_EMULATOR_HOST";

/// Optional settings file, for example:
///
/// ```toml
/// [database]
/// path = "data/oyster.db"
///
/// [pubsub]
/// endpoint = "https://pubsub.googleapis.com"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub pubsub: PubSubSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PubSubSettings {
    pub endpoint: String,
}

impl Default for PubSubSettings {
    fn default() -> Self {
        PubSubSettings {
            endpoint: DEFAULT_PUBSUB_ENDPOINT.to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`. When no path was asked for explicitly a missing
    /// default file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_SETTINGS_PATH), false),
        };
        if !required && !path.exists() {
            return Ok(Settings::default());
        }
        Ok(toml::from_str(&read_to_string(path)?)?)
    }
}

/// Where and how to publish, resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishConfig {
    pub project_id: String,
    pub topic: String,
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl PublishConfig {
    pub fn from_env(settings: &PubSubSettings) -> Result<Self, ConfigError> {
        Self::from_lookup(settings, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(settings: &PubSubSettings, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let project_id = non_empty(PROJECT_ID_VAR).ok_or(ConfigError::Missing(PROJECT_ID_VAR))?;
        let topic = non_empty(TOPIC_VAR).ok_or(ConfigError::Missing(TOPIC_VAR))?;
        let endpoint = match non_empty(EMULATOR_HOST_VAR) {
            Some(host) => format!("http://{}", host.trim()),
            None => settings.endpoint.trim_end_matches('/').to_string(),
        };

        Ok(PublishConfig {
            project_id,
            topic,
            endpoint,
            access_token: non_empty(ACCESS_TOKEN_VAR),
        })
    }
}
