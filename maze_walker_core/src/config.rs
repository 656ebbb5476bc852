//! Walker tuning, optionally loaded from a TOML file.
//!
//! ```toml
//! strafe_speed = 0.07
//! look_speed = 0.03
//! key_elevation = -0.25
//! tick_ms = 50
//! ```
//!
//! Missing keys fall back to the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::level::DEFAULT_KEY_ELEVATION;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkerConfig {
    /// World units moved per tick while strafing.
    pub strafe_speed: f32,
    /// Radians turned per tick while looking.
    pub look_speed: f32,
    /// z offset of key props.
    pub key_elevation: f32,
    /// Simulation tick length for front ends, in milliseconds.
    pub tick_ms: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            strafe_speed: 0.07,
            look_speed: 0.03,
            key_elevation: DEFAULT_KEY_ELEVATION,
            tick_ms: 50,
        }
    }
}

impl WalkerConfig {
    /// Load and validate config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WalkerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("strafe_speed", self.strafe_speed)?;
        positive("look_speed", self.look_speed)?;
        if !self.key_elevation.is_finite() {
            return Err(ConfigError::Invalid {
                field: "key_elevation",
                reason: format!("{} is not finite", self.key_elevation),
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be a positive number"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_walker_constants() {
        let config = WalkerConfig::default();
        assert_eq!(config.strafe_speed, 0.07);
        assert_eq!(config.look_speed, 0.03);
        assert_eq!(config.key_elevation, -0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(
            WalkerConfig::from_toml_str("").unwrap(),
            WalkerConfig::default()
        );
    }

    #[test]
    fn toml_overrides_fields() {
        let config = WalkerConfig::from_toml_str("strafe_speed = 0.1\ntick_ms = 20\n").unwrap();
        assert_eq!(config.strafe_speed, 0.1);
        assert_eq!(config.tick_ms, 20);
        assert_eq!(config.look_speed, 0.03);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = WalkerConfig::from_toml_str("look_speed = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "look_speed",
                ..
            }
        ));
        let err = WalkerConfig::from_toml_str("strafe_speed = -1.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "strafe_speed",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_tick() {
        assert!(matches!(
            WalkerConfig::from_toml_str("tick_ms = 0"),
            Err(ConfigError::Invalid {
                field: "tick_ms",
                ..
            })
        ));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(
            WalkerConfig::from_toml_str("speed = 1.0"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            WalkerConfig::from_toml_str("tick_ms = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
