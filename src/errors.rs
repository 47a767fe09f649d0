use thiserror::Error;

#[derive(Error, Debug)]
#[error("error loading configuration: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> ConfigError {
        ConfigError(e.to_string())
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> ConfigError {
        ConfigError(e.to_string())
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> ConfigError {
        ConfigError(e.to_string())
    }
}

#[derive(Error, Debug)]
#[error("nowcast initialization error: {0}")]
pub struct InitError(pub String);
impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> InitError {
        InitError(e.to_string())
    }
}
impl From<std::io::Error> for InitError {
    fn from(e: std::io::Error) -> InitError {
        InitError(e.to_string())
    }
}
impl From<log::SetLoggerError> for InitError {
    fn from(e: log::SetLoggerError) -> InitError {
        InitError(e.to_string())
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for InitError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> InitError {
        InitError(e.to_string())
    }
}

/// Store failures. An empty record set is rejected on save so a cycle
/// where every fetch failed can never truncate the previous snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("refusing to replace the record store with an empty record set")]
    EmptyRecordSet,
    #[error("no record store snapshot found at {0}")]
    NoSnapshot(String),
    #[error("record store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store document error: {0}")]
    Document(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("not enough usable rows for training: {got} remain, {min} required")]
    InsufficientData { got: usize, min: usize },
}

#[derive(Error, Debug)]
#[error("training error: {0}")]
pub struct TrainError(pub String);
impl From<smartcore::error::Failed> for TrainError {
    fn from(e: smartcore::error::Failed) -> TrainError {
        TrainError(format!("model fit/predict error: {}", e))
    }
}
impl From<serde_json::Error> for TrainError {
    fn from(e: serde_json::Error) -> TrainError {
        TrainError(format!("model document error: {}", e))
    }
}
impl From<std::io::Error> for TrainError {
    fn from(e: std::io::Error) -> TrainError {
        TrainError(format!("model artifact i/o error: {}", e))
    }
}

/// Cycle-level failure, tagged with the step that raised it.
/// The worker loop logs it and waits for the next interval.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("persist step failed: {0}")]
    Persist(#[from] StoreError),
    #[error("feature step failed: {0}")]
    Features(#[from] FeatureError),
    #[error("train step failed: {0}")]
    Train(#[from] TrainError),
}
