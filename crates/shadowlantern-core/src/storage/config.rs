//! TOML-based application configuration.
//!
//! Stores:
//! - Habituation test cadence and thresholds
//! - Diagnosis chat quota
//! - Interpretation service settings
//!
//! Configuration is stored at `~/.config/shadowlantern/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::date_key::parse_weekday;
use crate::error::{ConfigError, CoreError};
use crate::habit::{HabitSettings, HabituationMode};

/// Habit tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitConfig {
    /// Weekday of the reward-habituation test (`sun`, `mon`, ...).
    #[serde(default = "default_test_weekday")]
    pub test_weekday: String,
    #[serde(default = "default_min_streak_for_test")]
    pub min_streak_for_test: u32,
    #[serde(default = "default_passes_required")]
    pub passes_required: u32,
    #[serde(default)]
    pub habituation_mode: HabituationMode,
}

/// Diagnosis flow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisConfig {
    /// Exchanges per phase in the shadow interrogation.
    #[serde(default = "default_chat_quota")]
    pub chat_quota: u32,
}

/// Text-generation service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/shadowlantern/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub habit: HabitConfig,
    #[serde(default)]
    pub diagnosis: DiagnosisConfig,
    #[serde(default)]
    pub interpret: InterpretConfig,
}

// Default functions
fn default_test_weekday() -> String {
    "sun".into()
}
fn default_min_streak_for_test() -> u32 {
    7
}
fn default_passes_required() -> u32 {
    3
}
fn default_chat_quota() -> u32 {
    3
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for HabitConfig {
    fn default() -> Self {
        Self {
            test_weekday: default_test_weekday(),
            min_streak_for_test: 7,
            passes_required: 3,
            habituation_mode: HabituationMode::Recompute,
        }
    }
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self { chat_quota: 3 }
    }
}

impl Default for InterpretConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: 30,
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

impl HabitConfig {
    /// Resolve into tracker settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an unrecognized weekday.
    pub fn settings(&self) -> Result<HabitSettings, ConfigError> {
        let test_weekday =
            parse_weekday(&self.test_weekday).ok_or_else(|| ConfigError::InvalidValue {
                key: "habit.test_weekday".into(),
                message: format!("'{}' is not a weekday", self.test_weekday),
            })?;
        Ok(HabitSettings {
            test_weekday,
            min_streak_for_test: self.min_streak_for_test,
            passes_required: self.passes_required.max(1) as usize,
            habituation_mode: self.habituation_mode,
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default file location inside the data directory.
    ///
    /// # Errors
    /// Fails if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is missing.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf key with its current value, in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        const KEYS: [&str; 10] = [
            "habit.test_weekday",
            "habit.min_streak_for_test",
            "habit.passes_required",
            "habit.habituation_mode",
            "diagnosis.chat_quota",
            "interpret.model",
            "interpret.endpoint",
            "interpret.timeout_secs",
            "interpret.temperature",
            "interpret.max_output_tokens",
        ];
        KEYS.iter()
            .filter_map(|k| self.get(k).map(|v| (k.to_string(), v)))
            .collect()
    }

    /// Update a value in memory. Returns error if the key is unknown or the
    /// result does not validate; `self` is unchanged on error.
    ///
    /// # Errors
    /// [`ConfigError::UnknownKey`] or [`ConfigError::InvalidValue`].
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save to the data directory.
    ///
    /// # Errors
    /// See [`apply`](Self::apply) and [`save`](Self::save).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }

    /// Cross-field checks not expressible in the types.
    ///
    /// # Errors
    /// Returns the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.habit.settings()?;
        if self.diagnosis.chat_quota == 0 {
            return Err(ConfigError::InvalidValue {
                key: "diagnosis.chat_quota".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.interpret.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "interpret.timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if url::Url::parse(&self.interpret.endpoint).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "interpret.endpoint".into(),
                message: format!("'{}' is not a URL", self.interpret.endpoint),
            });
        }
        Ok(())
    }

    /// Leaf entries under `section` (`habit`, `diagnosis`, `interpret`).
    pub fn section(&self, section: &str) -> Vec<(String, String)> {
        let prefix = format!("{section}.");
        self.entries()
            .into_iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect()
    }
}
