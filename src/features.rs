use std::collections::{BTreeMap, BTreeSet};
use chrono::{Datelike, Timelike};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use crate::errors::FeatureError;
use crate::models::observation::Observation;

/// Model ready feature matrix with its prediction target, split into
/// train and test partitions. Rebuilt from scratch every cycle.
pub struct FeatureSet {
    pub columns: Vec<String>,
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<f64>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<f64>,
}

impl FeatureSet {
    pub fn feature_width(&self) -> usize {
        self.columns.len()
    }
}

/// Builds the feature set from a store snapshot.
///
/// The snapshot is partitioned by location and each partition sorted by
/// observation time. The target is the next observation's temperature
/// within the partition, so the last row of each partition has no target
/// and is dropped, as is any row with a non finite measurement.
///
/// The one-hot vocabularies for location and condition are derived from
/// the rows that survive those drops. They are not stable across
/// snapshots whose distinct values differ.
///
/// # Arguments
///
/// * 'snapshot' - the full record store snapshot
/// * 'test_fraction' - held out fraction for the test partition
/// * 'seed' - seed for the shuffle, fixed seed gives identical splits
/// * 'min_rows' - minimum number of usable rows required for training
pub fn build(snapshot: &Vec<Observation>, test_fraction: f64, seed: u64, min_rows: usize)
             -> Result<FeatureSet, FeatureError> {

    let mut by_location: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for observation in snapshot {
        by_location.entry(observation.location.as_str()).or_default().push(observation);
    }

    let mut rows: Vec<(&Observation, f64)> = Vec::new();
    for series in by_location.values_mut() {
        series.sort_by_key(|o| o.observed_at);
        for i in 0..series.len().saturating_sub(1) {
            let target_temp = series[i + 1].temperature;
            if has_complete_readings(series[i]) && target_temp.is_finite() {
                rows.push((series[i], target_temp));
            }
        }
    }

    if rows.len() < min_rows {
        return Err(FeatureError::InsufficientData { got: rows.len(), min: min_rows });
    }

    let locations: Vec<String> = rows.iter()
        .map(|(o, _)| o.location.to_string())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    let conditions: Vec<String> = rows.iter()
        .map(|(o, _)| o.condition.to_string())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let mut columns: Vec<String> = [
        "temperature", "humidity", "wind_speed", "pressure",
        "precipitation", "cloud_coverage", "hour", "day_of_week",
    ].iter().map(|c| c.to_string()).collect();
    columns.extend(locations.iter().map(|l| format!("location={}", l)));
    columns.extend(conditions.iter().map(|c| format!("condition={}", c)));

    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let mut rng = SmallRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((rows.len() as f64) * test_fraction).round() as usize;
    let test_len = test_len.max(1).min(rows.len() - 1);

    let mut feature_set = FeatureSet {
        columns,
        x_train: Vec::new(),
        y_train: Vec::new(),
        x_test: Vec::new(),
        y_test: Vec::new(),
    };

    for (position, index) in indices.iter().enumerate() {
        let (observation, target_temp) = rows[*index];
        let encoded = encode_row(observation, &locations, &conditions);
        if position < test_len {
            feature_set.x_test.push(encoded);
            feature_set.y_test.push(target_temp);
        } else {
            feature_set.x_train.push(encoded);
            feature_set.y_train.push(target_temp);
        }
    }

    Ok(feature_set)
}

/// Encodes one observation as a feature row: the numeric measurements,
/// hour and day of week, then the one-hot location and condition columns
///
/// # Arguments
///
/// * 'observation' - the observation to encode
/// * 'locations' - the location vocabulary
/// * 'conditions' - the condition vocabulary
fn encode_row(observation: &Observation, locations: &Vec<String>, conditions: &Vec<String>) -> Vec<f64> {
    let mut row = vec![
        observation.temperature,
        observation.humidity,
        observation.wind_speed,
        observation.pressure,
        observation.precipitation,
        observation.cloud_coverage,
        observation.observed_at.hour() as f64,
        observation.observed_at.weekday().num_days_from_monday() as f64,
    ];
    row.extend(locations.iter().map(|l| if *l == observation.location { 1.0 } else { 0.0 }));
    row.extend(conditions.iter().map(|c| if *c == observation.condition { 1.0 } else { 0.0 }));

    row
}

fn has_complete_readings(observation: &Observation) -> bool {
    [
        observation.temperature,
        observation.humidity,
        observation.wind_speed,
        observation.pressure,
        observation.precipitation,
        observation.cloud_coverage,
    ].iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn observation(location: &str, hour: u32, temperature: f64, condition: &str) -> Observation {
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
            condition: condition.to_string(),
        }
    }

    fn three_location_snapshot() -> Vec<Observation> {
        vec![
            observation("London", 12, 5.0, "Rain"),
            observation("London", 15, 6.5, "Rain"),
            observation("New York", 12, 2.0, "Clear"),
            observation("New York", 15, 3.0, "Clouds"),
            observation("Tokyo", 12, 10.0, "Clear"),
            observation("Tokyo", 15, 12.0, "Clear"),
        ]
    }

    #[test]
    fn drops_last_row_per_location_and_shifts_target() {
        let feature_set = build(&three_location_snapshot(), 0.2, 42, 1).unwrap();

        let mut targets: Vec<f64> = feature_set.y_train.iter()
            .chain(feature_set.y_test.iter())
            .copied()
            .collect();
        targets.sort_by(|a, b| a.partial_cmp(b).unwrap());

        // One usable row per location, target is that location's second temperature
        assert_eq!(targets, vec![3.0, 6.5, 12.0]);
    }

    #[test]
    fn feature_width_covers_numerics_and_one_hot_vocabularies() {
        let feature_set = build(&three_location_snapshot(), 0.2, 42, 1).unwrap();

        // 8 numeric columns, 3 locations, 2 conditions. "Clouds" only occurs
        // on a last-per-location row, which is dropped before the vocabularies
        // are derived.
        assert_eq!(feature_set.feature_width(), 13);
        assert!(feature_set.columns.contains(&"location=Tokyo".to_string()));
        assert!(feature_set.columns.contains(&"condition=Rain".to_string()));
        assert!(!feature_set.columns.contains(&"condition=Clouds".to_string()));
        for row in feature_set.x_train.iter().chain(feature_set.x_test.iter()) {
            assert_eq!(row.len(), 13);
        }
    }

    #[test]
    fn unsorted_input_is_ordered_per_location_before_the_shift() {
        let snapshot = vec![
            observation("London", 18, 8.0, "Clear"),
            observation("London", 12, 5.0, "Clear"),
            observation("London", 15, 6.5, "Clear"),
        ];
        let feature_set = build(&snapshot, 0.2, 42, 1).unwrap();

        let mut pairs: Vec<(f64, f64)> = Vec::new();
        for (row, target) in feature_set.x_train.iter().zip(feature_set.y_train.iter())
            .chain(feature_set.x_test.iter().zip(feature_set.y_test.iter())) {
            pairs.push((row[0], *target));
        }
        pairs.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_eq!(pairs, vec![(5.0, 6.5), (6.5, 8.0)]);
    }

    #[test]
    fn same_snapshot_and_seed_give_identical_partitions() {
        let mut snapshot = Vec::new();
        for hour in 0..12 {
            snapshot.push(observation("London", hour, hour as f64, "Clear"));
            snapshot.push(observation("Tokyo", hour, 10.0 + hour as f64, "Rain"));
        }

        let first = build(&snapshot, 0.2, 42, 10).unwrap();
        let second = build(&snapshot, 0.2, 42, 10).unwrap();

        assert_eq!(first.columns, second.columns);
        assert_eq!(first.x_train, second.x_train);
        assert_eq!(first.y_train, second.y_train);
        assert_eq!(first.x_test, second.x_test);
        assert_eq!(first.y_test, second.y_test);
    }

    #[test]
    fn too_few_usable_rows_is_an_error() {
        let result = build(&three_location_snapshot(), 0.2, 42, 10);
        assert!(matches!(result, Err(FeatureError::InsufficientData { got: 3, min: 10 })));
    }

    #[test]
    fn rows_with_missing_measurements_are_dropped() {
        let mut snapshot = vec![
            observation("London", 12, 5.0, "Clear"),
            observation("London", 15, 6.5, "Clear"),
            observation("London", 18, 8.0, "Clear"),
        ];
        snapshot[1].humidity = f64::NAN;

        let feature_set = build(&snapshot, 0.2, 42, 1).unwrap();

        // The 15:00 row is unusable, only the 12:00 row survives with its target
        assert_eq!(feature_set.x_train.len() + feature_set.x_test.len(), 1);
        let target = feature_set.y_train.first().or(feature_set.y_test.first()).unwrap();
        assert_eq!(*target, 6.5);
    }
}
