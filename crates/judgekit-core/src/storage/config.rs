//! TOML-based application configuration.
//!
//! Stores operator preferences:
//! - Round timer preset durations and tick interval
//! - Deck check target size and quick-increment buttons
//! - Display mode labels
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::timer::Preset;

/// Round timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTimerConfig {
    #[serde(default = "default_bo1_minutes")]
    pub bo1_minutes: u32,
    #[serde(default = "default_bo3_minutes")]
    pub bo3_minutes: u32,
    #[serde(default = "default_top_cut_minutes")]
    pub top_cut_minutes: u32,
    /// Interval between display recomputations while running.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Deck check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Legal deck size; the total turns green at exactly this count.
    #[serde(default = "default_target_size")]
    pub target_size: u32,
    /// Amounts offered as quick-add buttons per counter.
    #[serde(default = "default_quick_increments")]
    pub quick_increments: Vec<u32>,
}

/// Display mode configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_overtime_label")]
    pub overtime_label: String,
    /// Width of the text progress bars drawn by the terminal display.
    #[serde(default = "default_bar_width")]
    pub bar_width: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub round_timer: RoundTimerConfig,
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_bo1_minutes() -> u32 {
    30
}
fn default_bo3_minutes() -> u32 {
    50
}
fn default_top_cut_minutes() -> u32 {
    75
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_target_size() -> u32 {
    60
}
fn default_quick_increments() -> Vec<u32> {
    vec![1, 2, 3, 4]
}
fn default_overtime_label() -> String {
    "OVERTIME".into()
}
fn default_bar_width() -> u32 {
    40
}

impl Default for RoundTimerConfig {
    fn default() -> Self {
        Self {
            bo1_minutes: default_bo1_minutes(),
            bo3_minutes: default_bo3_minutes(),
            top_cut_minutes: default_top_cut_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            quick_increments: default_quick_increments(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            overtime_label: default_overtime_label(),
            bar_width: default_bar_width(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            round_timer: RoundTimerConfig::default(),
            deck: DeckConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl RoundTimerConfig {
    /// Minutes configured for a preset.
    pub fn preset_minutes(&self, preset: Preset) -> u32 {
        match preset {
            Preset::Bo1 => self.bo1_minutes,
            Preset::Bo3 => self.bo3_minutes,
            Preset::TopCut => self.top_cut_minutes,
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
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
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content)?;
        Ok(())
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

    /// Set a config value by key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
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
        assert_eq!(parsed.round_timer.bo3_minutes, 50);
        assert_eq!(parsed.deck.target_size, 60);
        assert_eq!(parsed.deck.quick_increments, vec![1, 2, 3, 4]);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[deck]\ntarget_size = 40\n").unwrap();
        assert_eq!(parsed.deck.target_size, 40);
        assert_eq!(parsed.deck.quick_increments, vec![1, 2, 3, 4]);
        assert_eq!(parsed.round_timer.bo1_minutes, 30);
        assert_eq!(parsed.display.overtime_label, "OVERTIME");
    }

    #[test]
    fn preset_minutes_follow_config() {
        let cfg = RoundTimerConfig::default();
        assert_eq!(cfg.preset_minutes(Preset::Bo1), 30);
        assert_eq!(cfg.preset_minutes(Preset::Bo3), 50);
        assert_eq!(cfg.preset_minutes(Preset::TopCut), 75);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("deck.target_size").as_deref(), Some("60"));
        assert_eq!(cfg.get("display.overtime_label").as_deref(), Some("OVERTIME"));
        assert!(cfg.get("deck.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("round_timer.bo1_minutes", "25").unwrap();
        assert_eq!(cfg.round_timer.bo1_minutes, 25);
    }

    #[test]
    fn apply_updates_array_from_json() {
        let mut cfg = Config::default();
        cfg.apply("deck.quick_increments", "[1, 5, 10]").unwrap();
        assert_eq!(cfg.deck.quick_increments, vec![1, 5, 10]);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("deck.nonexistent", "1").is_err());
        assert!(cfg.apply("nonexistent", "1").is_err());
    }

    #[test]
    fn apply_rejects_invalid_number() {
        let mut cfg = Config::default();
        assert!(cfg.apply("deck.target_size", "sixty").is_err());
        assert_eq!(cfg.deck.target_size, 60);
    }
}
