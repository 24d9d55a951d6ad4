//! Configuration file support for GlucoTwin.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/glucotwin/config.toml`.

use crate::{Error, FoodCategory, FoodEntry, Result, SafetyFlag};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,

    #[serde(default)]
    pub foods: FoodsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Forecast defaults used when the profile and command line leave them out
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_stress_level")]
    pub default_stress_level: f64,

    #[serde(default = "default_sleep_hours")]
    pub default_sleep_hours: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_stress_level: default_stress_level(),
            default_sleep_hours: default_sleep_hours(),
        }
    }
}

/// User-defined food entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomFood {
    pub name: String,
    pub carbs_per_100g: f64,
    pub glycemic_index: u8,
    #[serde(default)]
    pub fiber_per_100g: f64,
    pub category: FoodCategory,
    #[serde(default = "default_custom_safety")]
    pub safety: SafetyFlag,
    #[serde(default = "default_portion")]
    pub portion: String,
}

impl CustomFood {
    pub fn to_entry(&self) -> FoodEntry {
        FoodEntry {
            name: self.name.trim().to_lowercase(),
            carbs_per_100g: self.carbs_per_100g,
            glycemic_index: self.glycemic_index,
            category: self.category,
            fiber_per_100g: self.fiber_per_100g,
            safety: self.safety,
            portion: self.portion.clone(),
        }
    }
}

/// Food table configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct FoodsConfig {
    #[serde(default)]
    pub custom: Vec<CustomFood>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("glucotwin")
}

fn default_stress_level() -> f64 {
    5.0
}

fn default_sleep_hours() -> f64 {
    7.0
}

fn default_custom_safety() -> SafetyFlag {
    SafetyFlag::Moderate
}

fn default_portion() -> String {
    "100g".into()
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
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("glucotwin").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
