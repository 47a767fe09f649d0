use std::collections::HashSet;
use std::thread;
use std::time::Duration;
use log::{error, info, warn};
use crate::config::{Config, Pipeline};
use crate::errors::PipelineError;
use crate::features;
use crate::manager_openweather::OpenWeather;
use crate::models::observation::Observation;
use crate::store::Store;
use crate::trainer::Trainer;

/// Runs the periodic driver. The first cycle runs immediately, then one
/// cycle per configured interval. A failed cycle is logged and the loop
/// waits for the next interval, the process is kept alive.
///
/// Cycles run back to back on this single thread so a slow cycle can
/// never overlap the next tick.
///
/// # Arguments
///
/// * 'config' - the full configuration
/// * 'openweather' - forecast API manager
/// * 'store' - the record store
/// * 'trainer' - the model trainer
pub fn run(config: &Config, openweather: &OpenWeather, store: &Store, trainer: &Trainer) {
    let interval = Duration::from_secs(config.pipeline.interval_hours * 3600);
    info!("worker started, refresh cycle every {} hours", config.pipeline.interval_hours);

    loop {
        match run_cycle(config, openweather, store, trainer) {
            Ok(mae) => info!("refresh cycle completed, model mae {:.2}°C", mae),
            Err(e) => error!("refresh cycle failed: {}", e),
        }

        thread::sleep(interval);
    }
}

/// Runs one full refresh cycle: Ingest, Persist, Train
///
/// # Arguments
///
/// * 'config' - the full configuration
/// * 'openweather' - forecast API manager
/// * 'store' - the record store
/// * 'trainer' - the model trainer
fn run_cycle(config: &Config, openweather: &OpenWeather, store: &Store, trainer: &Trainer)
             -> Result<f64, PipelineError> {
    info!("starting refresh cycle for {} locations", config.weather.locations.len());

    let records = openweather.fetch_all(&config.weather.locations);

    process_records(records, store, trainer, &config.pipeline)
}

/// The Persist and Train steps of a cycle, given the fetched records.
///
/// An empty fetch result keeps the previous snapshot in place and the
/// cycle trains on whatever the store currently holds, which may be
/// stale data from a prior cycle. Any step failure aborts the remaining
/// steps, in particular the model artifact is only replaced after a
/// successful fit and evaluation.
///
/// # Arguments
///
/// * 'records' - the records fetched in this cycle, possibly empty
/// * 'store' - the record store
/// * 'trainer' - the model trainer
/// * 'pipeline' - the pipeline section of the configuration
fn process_records(records: Vec<Observation>, store: &Store, trainer: &Trainer, pipeline: &Pipeline)
                   -> Result<f64, PipelineError> {
    if records.is_empty() {
        warn!("no observations fetched, keeping the previous store snapshot");
    } else {
        let location_count = records.iter()
            .map(|r| r.location.as_str())
            .collect::<HashSet<&str>>()
            .len();
        store.save(&records)?;
        info!("stored {} records covering {} locations", records.len(), location_count);
    }

    let snapshot = store.load()?;

    let feature_set = features::build(
        &snapshot, pipeline.test_fraction, pipeline.seed, pipeline.min_training_rows)?;

    let model = trainer.fit(&feature_set.x_train, &feature_set.y_train)?;
    let mae = trainer.evaluate(&model, &feature_set.x_test, &feature_set.y_test)?;
    trainer.persist(&model)?;

    info!("model trained on {} rows with {} features, mae {:.2}°C",
          feature_set.x_train.len(), feature_set.feature_width(), mae);

    Ok(mae)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::errors::StoreError;

    fn pipeline() -> Pipeline {
        Pipeline {
            interval_hours: 6,
            min_training_rows: 10,
            test_fraction: 0.2,
            n_trees: 10,
            seed: 42,
        }
    }

    fn observation(location: &str, hour: u32, temperature: f64) -> Observation {
        let observed_at = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            .and_hms_opt(hour, 0, 0).unwrap();
        Observation {
            location: location.to_string(),
            observed_at,
            retrieved_at: observed_at,
            temperature,
            humidity: 80.0,
            wind_speed: 3.0,
            pressure: 1020.0,
            precipitation: 0.0,
            cloud_coverage: 50.0,
            condition: "Clear".to_string(),
        }
    }

    fn synthetic_records(hours_per_location: u32) -> Vec<Observation> {
        let mut records = Vec::new();
        for location in ["London", "Tokyo"] {
            for hour in 0..hours_per_location {
                records.push(observation(location, hour, 5.0 + hour as f64));
            }
        }
        records
    }

    fn store_and_trainer(dir: &tempfile::TempDir) -> (Store, Trainer) {
        let store = Store::new(dir.path().join("weather_data.csv").to_str().unwrap());
        let trainer = Trainer::new(dir.path().join("weather_model.json").to_str().unwrap(), 10, 42);
        (store, trainer)
    }

    #[test]
    fn full_cycle_stores_records_and_persists_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let (store, trainer) = store_and_trainer(&dir);

        let mae = process_records(synthetic_records(12), &store, &trainer, &pipeline()).unwrap();
        assert!(mae.is_finite() && mae >= 0.0);

        assert_eq!(store.load().unwrap().len(), 24);
        assert!(trainer.load().is_ok());
    }

    #[test]
    fn empty_fetch_keeps_prior_snapshot_and_trains_on_it() {
        let dir = tempfile::tempdir().unwrap();
        let (store, trainer) = store_and_trainer(&dir);

        let prior = synthetic_records(12);
        store.save(&prior).unwrap();

        process_records(Vec::new(), &store, &trainer, &pipeline()).unwrap();

        assert_eq!(store.load().unwrap().len(), prior.len());
        assert!(trainer.load().is_ok());
    }

    #[test]
    fn empty_fetch_without_prior_snapshot_fails_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (store, trainer) = store_and_trainer(&dir);

        let result = process_records(Vec::new(), &store, &trainer, &pipeline());

        assert!(matches!(result, Err(PipelineError::Persist(StoreError::NoSnapshot(_)))));
        assert!(trainer.load().is_err());
    }

    #[test]
    fn insufficient_snapshot_aborts_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let (store, trainer) = store_and_trainer(&dir);

        // Two timestamps per location leave one usable row each, below the minimum of 10
        let result = process_records(synthetic_records(2), &store, &trainer, &pipeline());

        assert!(matches!(result, Err(PipelineError::Features(_))));
        assert_eq!(store.load().unwrap().len(), 4);
        assert!(trainer.load().is_err());
    }
}
