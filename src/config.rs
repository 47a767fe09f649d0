use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize)]
pub struct Weather {
    pub api_key: String,
    pub units: String,
    pub locations: Vec<String>,
}

#[derive(Deserialize)]
pub struct Pipeline {
    pub interval_hours: u64,
    #[serde(default = "default_min_training_rows")]
    pub min_training_rows: usize,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_n_trees")]
    pub n_trees: u16,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Deserialize)]
pub struct Files {
    pub store_file: String,
    pub model_file: String,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub weather: Weather,
    pub pipeline: Pipeline,
    pub files: Files,
    pub general: General,
}

fn default_min_training_rows() -> usize { 10 }
fn default_test_fraction() -> f64 { 0.2 }
fn default_n_trees() -> u16 { 100 }
fn default_seed() -> u64 { 42 }

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {

    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    validate(&config)?;

    Ok(config)
}

/// Checks configuration items that would otherwise surface as obscure
/// runtime failures deep inside a cycle
///
/// # Arguments
///
/// * 'config' - the configuration to validate
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.weather.api_key.is_empty() {
        return Err(ConfigError::from("weather.api_key must not be empty"));
    }
    if config.weather.locations.is_empty() {
        return Err(ConfigError::from("weather.locations must not be empty"));
    }
    if config.weather.locations.iter().any(|l| l.is_empty()) {
        return Err(ConfigError::from("weather.locations must not contain empty names"));
    }
    if config.pipeline.interval_hours == 0 {
        return Err(ConfigError::from("pipeline.interval_hours must be at least 1"));
    }
    if config.pipeline.test_fraction <= 0.0 || config.pipeline.test_fraction >= 1.0 {
        return Err(ConfigError::from("pipeline.test_fraction must be between 0 and 1"));
    }
    if config.pipeline.n_trees == 0 {
        return Err(ConfigError::from("pipeline.n_trees must be at least 1"));
    }

    Ok(())
}
