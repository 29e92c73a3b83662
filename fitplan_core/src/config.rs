//! Configuration file support for Fitplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitplan/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub weekly: WeeklyConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Data locations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    /// Exercise catalog CSV; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Directory relative export paths are written under
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            export_dir: default_export_dir(),
        }
    }
}

/// Daily planner parameters.
///
/// Penalties are in the same units as the calorie score they are
/// subtracted from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    #[serde(default = "default_rest_buffer_minutes")]
    pub rest_buffer_minutes: u32,

    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f64,

    #[serde(default = "default_adjacent_body_part_penalty")]
    pub adjacent_body_part_penalty: f64,

    #[serde(default = "default_weekly_body_part_penalty")]
    pub weekly_body_part_penalty: f64,

    /// Largest day budget (minutes) handed to the knapsack planner
    #[serde(default = "default_dp_minutes_ceiling")]
    pub dp_minutes_ceiling: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rest_buffer_minutes: default_rest_buffer_minutes(),
            repeat_penalty: default_repeat_penalty(),
            adjacent_body_part_penalty: default_adjacent_body_part_penalty(),
            weekly_body_part_penalty: default_weekly_body_part_penalty(),
            dp_minutes_ceiling: default_dp_minutes_ceiling(),
        }
    }
}

/// Weekly diversity parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyConfig {
    #[serde(default = "default_diversity_threshold")]
    pub diversity_threshold: usize,

    #[serde(default = "default_diversity_penalty")]
    pub diversity_penalty: f64,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            diversity_threshold: default_diversity_threshold(),
            diversity_penalty: default_diversity_penalty(),
        }
    }
}

/// Multi-week scheduling parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            total_weeks: default_total_weeks(),
        }
    }
}

// Default value functions
fn default_export_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("fitplan")
}

fn default_rest_buffer_minutes() -> u32 {
    2
}

fn default_repeat_penalty() -> f64 {
    10_000.0
}

fn default_adjacent_body_part_penalty() -> f64 {
    50.0
}

fn default_weekly_body_part_penalty() -> f64 {
    10.0
}

fn default_dp_minutes_ceiling() -> u32 {
    24 * 60
}

fn default_diversity_threshold() -> usize {
    3
}

fn default_diversity_penalty() -> f64 {
    50.0
}

fn default_total_weeks() -> u32 {
    4
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("fitplan").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Where an export named on the command line should be written
    pub fn export_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data.export_dir.join(path)
        }
    }

    /// Reject values the planners cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.planner.dp_minutes_ceiling == 0 {
            return Err(Error::Config("planner.dp_minutes_ceiling must be > 0".into()));
        }
        if self.schedule.total_weeks == 0 {
            return Err(Error::Config("schedule.total_weeks must be > 0".into()));
        }

        let penalties = [
            ("planner.repeat_penalty", self.planner.repeat_penalty),
            (
                "planner.adjacent_body_part_penalty",
                self.planner.adjacent_body_part_penalty,
            ),
            (
                "planner.weekly_body_part_penalty",
                self.planner.weekly_body_part_penalty,
            ),
            ("weekly.diversity_penalty", self.weekly.diversity_penalty),
        ];
        for (key, value) in penalties {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.planner.rest_buffer_minutes, 2);
        assert_eq!(config.weekly.diversity_threshold, 3);
        assert_eq!(config.weekly.diversity_penalty, 50.0);
        assert_eq!(config.schedule.total_weeks, 4);
        assert!(config.data.catalog_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.planner, parsed.planner);
        assert_eq!(config.weekly, parsed.weekly);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[planner]
rest_buffer_minutes = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planner.rest_buffer_minutes, 3);
        assert_eq!(config.planner.repeat_penalty, 10_000.0); // default
        assert_eq!(config.schedule.total_weeks, 4); // default
    }

    #[test]
    fn test_export_path_uses_export_dir_for_relative_paths() {
        let mut config = Config::default();
        config.data.export_dir = PathBuf::from("/srv/fitplan");

        assert_eq!(
            config.export_path(Path::new("plan.json")),
            PathBuf::from("/srv/fitplan/plan.json")
        );
        assert_eq!(
            config.export_path(Path::new("/tmp/plan.csv")),
            PathBuf::from("/tmp/plan.csv")
        );
    }

    #[test]
    fn test_validate_rejects_zero_weeks() {
        let mut config = Config::default();
        config.schedule.total_weeks = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_negative_penalty() {
        let mut config = Config::default();
        config.planner.adjacent_body_part_penalty = -1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load_from() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.schedule.total_weeks = 8;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.schedule.total_weeks, 8);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\ndp_minutes_ceiling = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
