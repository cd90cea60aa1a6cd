//! Configuration for hosts embedding the calculators
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config file (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: FITCALC__)
//!
//! The calorie offsets and macro ratios are fixed constants and are not
//! configurable here.

use crate::cache::{FileStore, KeyValueStore, LastInputsCache, MemoryStore, DEFAULT_LAST_INPUTS_KEY};
use crate::errors::CalcError;
use crate::forms::Calculator;
use crate::health_metrics::{ActivityLevel, Goal, Sex};
use crate::units::UnitSystem;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Calculator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatorConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub defaults: FormDefaults,
}

/// Last-inputs cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub key: String,
    /// JSON file backing the cache; in-memory when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_LAST_INPUTS_KEY.to_string(),
            file: None,
        }
    }
}

/// Pre-selected choices: what a fresh form shows and what an empty select means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    /// Units of the BMI form and of both energy form toggles
    pub unit_system: UnitSystem,
    pub sex: Sex,
    pub activity: ActivityLevel,
    pub goal: Goal,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::Metric,
            sex: Sex::Male,
            activity: ActivityLevel::ModeratelyActive,
            goal: Goal::Maintain,
        }
    }
}

impl CalculatorConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with FITCALC__ prefix
    pub fn load() -> Result<Self, CalcError> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&CalculatorConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., FITCALC__CACHE__KEY=calc:bmi sets cache.key
            .add_source(config::Environment::with_prefix("FITCALC").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Build the last-inputs cache this configuration describes
    pub fn last_inputs_cache(&self) -> LastInputsCache<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match &self.cache.file {
            Some(path) => Box::new(FileStore::new(path)),
            None => Box::new(MemoryStore::new()),
        };
        LastInputsCache::with_key(store, self.cache.key.clone())
    }

    /// Calculator forms using these defaults and the configured cache
    pub fn calculator(&self) -> Calculator<Box<dyn KeyValueStore>> {
        Calculator::new(self.defaults.clone(), self.last_inputs_cache())
    }
}
