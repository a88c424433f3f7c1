//! Capture configuration.
//!
//! Sources, later ones winning:
//!   1. built-in defaults
//!   2. `<config_dir>/image-input/config.json`
//!        Linux:   ~/.config/image-input/config.json
//!        macOS:   ~/Library/Application Support/image-input/config.json
//!        Windows: %APPDATA%/image-input/config.json
//!   3. environment (`.env` is loaded first if present)

use crate::capture::validate::DEFAULT_ACCEPTED_TYPES;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_SLOT: &str = "IMAGE_INPUT_SLOT";
pub const ENV_TYPES: &str = "IMAGE_INPUT_TYPES";
pub const ENV_VERIFY: &str = "IMAGE_INPUT_VERIFY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Data sink slot the encoded image is stored under.
    pub slot_name: String,
    /// Exact MIME types a selection may declare.
    pub accepted_types: Vec<String>,
    /// Sniff file headers before accepting the content.
    pub verify_content: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            slot_name: "faceImage".to_string(),
            accepted_types: DEFAULT_ACCEPTED_TYPES.iter().map(|t| t.to_string()).collect(),
            verify_content: true,
        }
    }
}

/// Default location of the JSON config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("image-input")
        .join("config.json")
}

impl CaptureConfig {
    pub fn with_slot(slot_name: impl Into<String>) -> Self {
        Self {
            slot_name: slot_name.into(),
            ..Self::default()
        }
    }

    /// Loads `.env`, the config file at [`config_path`] and env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("[CONFIG] Ignoring unreadable .env: {}", e);
            }
        }

        let mut config = Self::from_file(&config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        if config.widens_default_types() {
            log::warn!(
                "[CONFIG] accepted_types {:?} go beyond PNG/JPEG; the upload error text still names only PNG and JPEG",
                config.accepted_types
            );
        }

        log::info!(
            "[CONFIG] slot={} types={:?} verify={}",
            config.slot_name,
            config.accepted_types,
            config.verify_content
        );
        Ok(config)
    }

    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Applies environment-style overrides supplied by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(slot) = lookup(ENV_SLOT) {
            self.slot_name = slot.trim().to_string();
        }
        if let Some(types) = lookup(ENV_TYPES) {
            self.accepted_types = types
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(verify) = lookup(ENV_VERIFY) {
            self.verify_content = match verify.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_VERIFY,
                        value: other.to_string(),
                    })
                }
            };
        }
        Ok(())
    }

    /// `true` when the allow-list admits a type outside the PNG/JPEG default,
    /// i.e. when the fixed upload error message under-describes it.
    pub fn widens_default_types(&self) -> bool {
        self.accepted_types.iter().any(|t| {
            !DEFAULT_ACCEPTED_TYPES
                .iter()
                .any(|d| d.eq_ignore_ascii_case(t.trim()))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "slot_name",
                value: self.slot_name.clone(),
            });
        }
        if self.accepted_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "accepted_types",
                value: "[]".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_accept_png_and_jpeg() {
        let c = CaptureConfig::default();
        assert_eq!(c.slot_name, "faceImage");
        assert_eq!(c.accepted_types, vec!["image/png", "image/jpeg"]);
        assert!(c.verify_content);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: CaptureConfig = serde_json::from_str(r#"{ "slot_name": "photoIdImage" }"#).unwrap();
        assert_eq!(c.slot_name, "photoIdImage");
        assert_eq!(c.accepted_types.len(), 2);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let c = CaptureConfig::from_file(Path::new("/no/such/image-input.json")).unwrap();
        assert_eq!(c, CaptureConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let mut c = CaptureConfig::default();
        c.apply_overrides(env(&[
            (ENV_SLOT, " photoIdImage "),
            (ENV_TYPES, "image/png, image/webp,"),
            (ENV_VERIFY, "off"),
        ]))
        .unwrap();
        assert_eq!(c.slot_name, "photoIdImage");
        assert_eq!(c.accepted_types, vec!["image/png", "image/webp"]);
        assert!(!c.verify_content);
    }

    #[test]
    fn bad_verify_flag_is_rejected() {
        let mut c = CaptureConfig::default();
        let result = c.apply_overrides(env(&[(ENV_VERIFY, "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: ENV_VERIFY, .. })));
    }

    #[test]
    fn empty_allow_list_fails_validation() {
        let mut c = CaptureConfig::default();
        c.apply_overrides(env(&[(ENV_TYPES, " , ")])).unwrap();
        assert!(c.validate().is_err());
    }

    #[test]
    fn detects_types_beyond_the_default_list() {
        let mut c = CaptureConfig::default();
        assert!(!c.widens_default_types());

        c.apply_overrides(env(&[(ENV_TYPES, "image/png")])).unwrap();
        assert!(!c.widens_default_types());

        c.apply_overrides(env(&[(ENV_TYPES, "image/png,image/webp")])).unwrap();
        assert!(c.widens_default_types());
    }

    #[test]
    fn config_path_ends_with_app_dir() {
        let p = config_path();
        assert!(p.ends_with("image-input/config.json"));
    }
}
