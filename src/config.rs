//! Engine configuration
//!
//! Topology is data, not code: rack boundaries, column ranges and group
//! labels live in a TOML file (or the built-in standard layout) so a floor
//! change never requires touching the allocator. Values are layered:
//! built-in defaults, then the config file, then `COLMEIA_*` environment
//! overrides.

use crate::error::{Error, Result};
use crate::warehouse::{RackConfig, RackTopology};
use chrono::FixedOffset;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Racks in priority order
    pub racks: Vec<RackConfig>,
    /// Offset used when rendering plant-local timestamps (hours from UTC)
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

fn default_utc_offset_hours() -> i32 {
    -3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            racks: RackConfig::standard_layout(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl EngineConfig {
    /// Load configuration, layering defaults, an optional TOML file and
    /// `COLMEIA_*` environment overrides. The result is fully validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&EngineConfig::default())
            .map_err(|e| Error::Config(e.to_string()))?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("COLMEIA").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let config: EngineConfig = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build the validated topology described by this configuration
    pub fn topology(&self) -> Result<RackTopology> {
        RackTopology::new(self.racks.clone())
    }

    /// Offset for rendering plant-local timestamps
    pub fn local_offset(&self) -> FixedOffset {
        // Validated range, so the conversion cannot fail
        FixedOffset::east_opt(self.utc_offset_hours * 3600).expect("validated offset")
    }

    /// Serialize this configuration as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(Error::Config(format!(
                "utc_offset_hours {} is out of range",
                self.utc_offset_hours
            )));
        }
        self.topology()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        let topology = config.topology().unwrap();
        assert_eq!(topology.racks().len(), 3);
        assert_eq!(config.utc_offset_hours, -3);
    }

    #[test]
    fn test_load_without_file_uses_standard_layout() {
        let config = EngineConfig::load(None).unwrap();
        assert_eq!(config.racks.len(), 3);
        assert_eq!(config.racks[0].name, "RACK1");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::default();
        let text = config.to_toml().unwrap();
        let back: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.racks.len(), config.racks.len());
        assert_eq!(back.utc_offset_hours, config.utc_offset_hours);
    }

    #[test]
    fn test_partial_rack_entry_fills_defaults() {
        let text = r#"
            [[racks]]
            name = "RACK1"
            first_position = 1
            end_position = 10
        "#;
        let config: EngineConfig = toml::from_str(text).unwrap();
        assert_eq!(config.racks[0].first_column, 'A');
        assert_eq!(config.racks[0].last_column, 'M');
        assert_eq!(config.racks[0].label, "COLMEIA");
        assert!(config.topology().is_ok());
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let config = EngineConfig {
            utc_offset_hours: 40,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_offset() {
        let config = EngineConfig::default();
        assert_eq!(config.local_offset().utc_minus_local(), 3 * 3600);
    }
}
