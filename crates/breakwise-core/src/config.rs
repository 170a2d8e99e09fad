//! TOML-based user configuration.
//!
//! Stores the activity catalogue, the user's favorites, the calendar feed
//! URL and the explore/exploit parameters. Stored at
//! `~/.config/breakwise/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/breakwise[-dev]/` based on BREAKWISE_ENV.
///
/// Set BREAKWISE_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BREAKWISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("breakwise-dev")
    } else {
        base_dir.join("breakwise")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// User configuration.
///
/// Serialized to/from TOML at `~/.config/breakwise/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Full activity catalogue offered during onboarding.
    #[serde(default = "default_activities")]
    pub activities: Vec<String>,
    /// Activities the user picked; candidates for every suggestion.
    #[serde(default)]
    pub favorites: Vec<String>,
    /// iCalendar feed URL, empty when not linked.
    #[serde(default)]
    pub calendar_url: String,
    /// Exploration probability.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Softmax temperature.
    #[serde(default = "default_tau")]
    pub tau: f64,
    /// Default break length in minutes.
    #[serde(default = "default_duration")]
    pub default_duration_minutes: i64,
}

fn default_activities() -> Vec<String> {
    [
        "Walk outside",
        "Stretch",
        "Breathe 4-7-8",
        "Tea break",
        "Power nap",
        "Quick tidy-up",
        "Listen to calm track",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_epsilon() -> f64 {
    0.05
}
fn default_tau() -> f64 {
    0.8
}
fn default_duration() -> i64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            activities: default_activities(),
            favorites: Vec::new(),
            calendar_url: String::new(),
            epsilon: default_epsilon(),
            tau: default_tau(),
            default_duration_minutes: default_duration(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the config, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_or_default() -> Self {
        let Ok(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist the config as TOML.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Read a single value by key, for `config get`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "epsilon" => Some(self.epsilon.to_string()),
            "tau" => Some(self.tau.to_string()),
            "calendar_url" => Some(self.calendar_url.clone()),
            "default_duration_minutes" => Some(self.default_duration_minutes.to_string()),
            "favorites" => Some(self.favorites.join(", ")),
            "activities" => Some(self.activities.join(", ")),
            _ => None,
        }
    }

    /// Set a single value by key, for `config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "epsilon" => {
                let v: f64 = value.parse().map_err(|_| invalid("expected a number"))?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(invalid("epsilon must be within 0..=1"));
                }
                self.epsilon = v;
            }
            "tau" => {
                let v: f64 = value.parse().map_err(|_| invalid("expected a number"))?;
                if v <= 0.0 {
                    return Err(invalid("tau must be positive"));
                }
                self.tau = v;
            }
            "calendar_url" => self.calendar_url = value.to_string(),
            "default_duration_minutes" => {
                let v: i64 = value.parse().map_err(|_| invalid("expected an integer"))?;
                if !(1..=24 * 60).contains(&v) {
                    return Err(invalid("duration must be within 1..=1440 minutes"));
                }
                self.default_duration_minutes = v;
            }
            _ => return Err(invalid("unknown key")),
        }
        Ok(())
    }
}
