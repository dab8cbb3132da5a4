use std::{fs, path};
use tracing::info;

use crate::Settings;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("Missing config field: {0}")]
    MissingField(String),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub trait Configurable {
    fn config(&self) -> &serde_yaml::Value;

    // read configuration from yaml config
    fn load_config(
        config_file_path: impl AsRef<path::Path>,
    ) -> Result<serde_yaml::Value, ConfigError> {
        let content: String = fs::read_to_string(config_file_path)?;
        let config: serde_yaml::Value = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Extract Value from config using dot notation i.e. "platforms.twitter.user_id"
    fn get_config_value(&self, key: &str) -> Option<&serde_yaml::Value> {
        let keys: Vec<&str> = key.split('.').collect();
        Self::get_value_recursive(self.config(), &keys)
    }

    fn get_value_recursive<'a>(
        config: &'a serde_yaml::Value,
        keys: &[&str],
    ) -> Option<&'a serde_yaml::Value> {
        let (key, remaining_keys) = keys.split_first()?;
        if key.is_empty() {
            return None;
        }

        match config {
            serde_yaml::Value::Mapping(map) => {
                let value = map.get(serde_yaml::Value::String(key.to_string()))?;
                if remaining_keys.is_empty() {
                    Some(value)
                } else {
                    Self::get_value_recursive(value, remaining_keys)
                }
            }
            _ => None,
        }
    }
}

/// Raw YAML document plus the typed [`Settings`] parsed from it.
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    raw: serde_yaml::Value,
    pub settings: Settings,
}

impl Configurable for FanoutConfig {
    fn config(&self) -> &serde_yaml::Value {
        &self.raw
    }
}

impl FanoutConfig {
    pub fn from_file(
        config_file_path: impl AsRef<path::Path>,
    ) -> Result<Self, ConfigError> {
        Self::from_file_with_overrides(config_file_path, |_| None)
    }

    /// Load a YAML file and apply overrides (secrets, `REDIS_URI`) from
    /// `lookup` before validating.
    pub fn from_file_with_overrides(
        config_file_path: impl AsRef<path::Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = config_file_path.as_ref();
        let raw = Self::load_config(path)?;
        let config = Self::from_value_with_overrides(raw, lookup)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_value(raw: serde_yaml::Value) -> Result<Self, ConfigError> {
        Self::from_value_with_overrides(raw, |_| None)
    }

    pub fn from_value_with_overrides(
        raw: serde_yaml::Value,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // an empty document means "all defaults"
        let mut settings: Settings = if raw.is_null() {
            Settings::default()
        } else {
            serde_yaml::from_value(raw.clone())?
        };
        settings.apply_overrides(lookup);
        settings.validate()?;
        Ok(Self { raw, settings })
    }
}
