//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default planning mode (normal or cram)
//! - Daily availability window and lookahead
//! - Morning digest timing
//!
//! Configuration is stored at `~/.config/studyplan/config.toml`.

use std::path::{Path, PathBuf};

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::digest::DigestScheduler;
use crate::error::ConfigError;
use crate::planner::{resolve_policy, DailyWindow, PlanPolicy, WindowPlanner, LOOKAHEAD_DAYS};

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Plan in cram mode unless overridden per call.
    #[serde(default)]
    pub cram: bool,
    #[serde(default = "default_day_start")]
    pub day_start: String,
    #[serde(default = "default_day_end")]
    pub day_end: String,
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
}

/// Daily digest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_digest_hour")]
    pub hour: u32,
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub digest: DigestConfig,
}

fn default_day_start() -> String {
    "08:00".into()
}
fn default_day_end() -> String {
    "22:00".into()
}
fn default_lookahead_days() -> u32 {
    LOOKAHEAD_DAYS
}
fn default_true() -> bool {
    true
}
fn default_digest_hour() -> u32 {
    8
}
fn default_grace_minutes() -> u32 {
    5
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cram: false,
            day_start: default_day_start(),
            day_end: default_day_end(),
            lookahead_days: default_lookahead_days(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: default_digest_hour(),
            grace_minutes: default_grace_minutes(),
        }
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk, writing the defaults out when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not match the
    /// key's type, or the resulting config is invalid. `self` is left
    /// unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        DailyWindow::parse(&self.planner.day_start, &self.planner.day_end).map_err(|e| {
            ConfigError::InvalidValue {
                key: "planner.day_start".into(),
                message: e.to_string(),
            }
        })?;
        if self.planner.lookahead_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "planner.lookahead_days".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.digest.hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "digest.hour".into(),
                message: "must be between 0 and 23".into(),
            });
        }
        Ok(())
    }

    /// Daily availability window, falling back to 08:00-22:00 when invalid.
    pub fn availability(&self) -> DailyWindow {
        DailyWindow::parse(&self.planner.day_start, &self.planner.day_end).unwrap_or_else(|e| {
            warn!(error = %e, "invalid planner window, using default");
            DailyWindow::default()
        })
    }

    /// Policy for an explicit cram flag, or the configured default.
    pub fn policy(&self, cram: Option<bool>) -> PlanPolicy {
        resolve_policy(cram.unwrap_or(self.planner.cram))
    }

    /// Window planner for `tz` with the configured window and lookahead.
    pub fn planner<Tz: TimeZone>(&self, tz: Tz) -> WindowPlanner<Tz> {
        WindowPlanner::new(tz)
            .with_window(self.availability())
            .with_lookahead_days(self.planner.lookahead_days)
    }

    pub fn digest_scheduler(&self) -> DigestScheduler {
        DigestScheduler::new(self.digest.hour, self.digest.grace_minutes)
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
        assert!(!parsed.planner.cram);
        assert_eq!(parsed.planner.day_start, "08:00");
        assert_eq!(parsed.digest.hour, 8);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[planner]\ncram = true\n").unwrap();
        assert!(parsed.planner.cram);
        assert_eq!(parsed.planner.day_end, "22:00");
        assert_eq!(parsed.planner.lookahead_days, 14);
        assert!(parsed.digest.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("planner.cram").as_deref(), Some("false"));
        assert_eq!(cfg.get("planner.day_start").as_deref(), Some("08:00"));
        assert_eq!(cfg.get("digest.grace_minutes").as_deref(), Some("5"));
        assert!(cfg.get("planner.missing_key").is_none());
        assert!(cfg.get("planner").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("planner.cram", "true").unwrap();
        cfg.set("planner.lookahead_days", "7").unwrap();
        cfg.set("planner.day_start", "09:30").unwrap();
        assert!(cfg.planner.cram);
        assert_eq!(cfg.planner.lookahead_days, 7);
        assert_eq!(cfg.availability().start.to_string(), "09:30:00");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("planner.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_wrong_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("planner.cram", "sometimes").is_err());
        assert!(cfg.set("digest.hour", "-1").is_err());
    }

    #[test]
    fn set_rejects_invalid_combination_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.set("planner.day_end", "07:00").is_err());
        assert_eq!(cfg.planner.day_end, "22:00");
        assert!(cfg.set("planner.lookahead_days", "0").is_err());
        assert!(cfg.set("digest.hour", "24").is_err());
    }

    #[test]
    fn policy_follows_config_default() {
        let mut cfg = Config::default();
        assert_eq!(cfg.policy(None).max_per_day_mins, Some(240));
        cfg.planner.cram = true;
        assert_eq!(cfg.policy(None).max_per_day_mins, Some(360));
        assert_eq!(cfg.policy(Some(false)).max_per_day_mins, Some(240));
    }

    #[test]
    fn invalid_window_falls_back_to_default() {
        let mut cfg = Config::default();
        cfg.planner.day_start = "late".into();
        assert_eq!(cfg.availability(), DailyWindow::default());
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.planner.lookahead_days, 14);

        let mut changed = cfg.clone();
        changed.set("digest.hour", "7").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().digest.hour, 7);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "planner = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
