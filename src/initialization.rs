use std::env;
use log::info;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{load_config, Config, General};
use crate::errors::InitError;
use crate::manager_openweather::OpenWeather;
use crate::store::Store;
use crate::trainer::Trainer;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

/// Loads the configuration, sets up logging and returns the managers
/// the worker needs. The configuration file path is taken from the
/// NOWCAST_CONFIG environment variable and defaults to ./config.toml
///
pub fn init() -> Result<(Config, OpenWeather, Store, Trainer), InitError> {
    let config_path = env::var("NOWCAST_CONFIG").unwrap_or("config.toml".to_string());
    let config = load_config(&config_path)?;

    setup_logging(&config.general)?;

    info!("nowcast version: {}", env!("CARGO_PKG_VERSION"));
    info!("using configuration from {}", config_path);

    let openweather = OpenWeather::new(&config.weather);
    let store = Store::new(&config.files.store_file);
    let trainer = Trainer::new(
        &config.files.model_file, config.pipeline.n_trees, config.pipeline.seed);

    Ok((config, openweather, store, trainer))
}

/// Configures log4rs with a file appender and optionally a stdout
/// appender
///
/// # Arguments
///
/// * 'general' - the general section of the configuration
fn setup_logging(general: &General) -> Result<(), InitError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)?;

    let mut builder = log4rs::config::Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let log_config = builder.build(root.build(general.log_level))?;
    log4rs::init_config(log_config)?;

    Ok(())
}
