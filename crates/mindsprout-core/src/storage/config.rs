//! TOML-based application configuration.
//!
//! Stores engine settings:
//! - Storage locations (shared directory override)
//! - Reader refresh policy (signal-driven by default)
//! - Optional custom milestone table
//!
//! Configuration is stored at `~/.config/mindsprout/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, EngineError, Result};
use crate::milestone::{MilestoneStage, MilestoneTable};

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the shared store and the change signal. When unset,
    /// `<data_dir>/shared` is used.
    #[serde(default)]
    pub shared_dir: Option<PathBuf>,
}

/// Reader refresh configuration.
///
/// The snapshot provider refreshes only on the writer's change signal:
/// accumulated practice time changes only when a session is recorded, so a
/// timer adds nothing in the nominal case. `interval_secs` is a safety net
/// for hosts that may drop signals; it is off by default and not part of
/// the primary contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mindsprout/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Custom milestone table override. Validated on use; the built-in
    /// growth stages apply when unset.
    #[serde(default)]
    pub milestones: Option<Vec<MilestoneStage>>,
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
    ) -> Result<()> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(EngineError::Config(ConfigError::MissingKey(key.into())));
        }

        let unknown = || {
            EngineError::Config(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "unknown config key".into(),
            })
        };
        let unparsable = |message: String| {
            EngineError::Config(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| unparsable(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    unparsable(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(unparsable(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)?
                    }
                    serde_json::Value::Null => {
                        // Optional fields: accept number, bool, or string.
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(b) = value.parse::<bool>() {
                            serde_json::Value::Bool(b)
                        } else {
                            serde_json::Value::String(value.into())
                        }
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

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    EngineError::Config(ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| {
            EngineError::Config(ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// The effective shared directory for this configuration.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn shared_dir(&self) -> Result<PathBuf> {
        match &self.storage.shared_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => super::shared_dir(),
        }
    }

    /// The effective milestone table: the configured override when present,
    /// otherwise the built-in growth stages.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidMilestones`] if the override table is
    /// malformed.
    pub fn milestone_table(&self) -> Result<MilestoneTable, ConfigError> {
        match &self.milestones {
            Some(stages) => MilestoneTable::new(stages.clone()),
            None => Ok(MilestoneTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.storage.shared_dir.is_none());
        assert!(parsed.refresh.interval_secs.is_none());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config {
            refresh: RefreshConfig {
                interval_secs: Some(900),
            },
            ..Default::default()
        };
        assert_eq!(cfg.get("refresh.interval_secs").as_deref(), Some("900"));
        assert!(cfg.get("refresh.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_optional_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "refresh.interval_secs", "600").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "refresh.interval_secs").unwrap(),
            &serde_json::Value::Number(600.into())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "storage.nonexistent", "x");
        assert!(result.is_err());
    }

    #[test]
    fn default_milestone_table_resolves() {
        let cfg = Config::default();
        let table = cfg.milestone_table().unwrap();
        assert_eq!(table.stages().len(), 6);
    }

    #[test]
    fn invalid_milestone_override_is_rejected() {
        let cfg = Config {
            milestones: Some(vec![MilestoneStage {
                name: "Late".into(),
                min_minutes: 10,
                icon: "late".into(),
            }]),
            ..Default::default()
        };
        assert!(cfg.milestone_table().is_err());
    }
}
