use std::collections::BTreeMap;
use chrono::NaiveDateTime;
use crate::errors::StoreError;
use crate::models::observation::Observation;
use crate::store::Store;

/// One aggregated point in the historical series
pub struct SeriesPoint {
    pub observed_at: NaiveDateTime,
    pub location: String,
    pub mean_temperature: f64,
}

/// Returns the most recent row of the current store snapshot, or None
/// for a snapshot without rows
///
/// # Arguments
///
/// * 'store' - the record store to read from
pub fn latest_observation(store: &Store) -> Result<Option<Observation>, StoreError> {
    let snapshot = store.load()?;

    Ok(snapshot.into_iter().last())
}

/// Returns the historical temperature series for charting: mean
/// temperature per observation time and location, time ordered
///
/// # Arguments
///
/// * 'store' - the record store to read from
/// * 'locations' - optional location subset to filter on
pub fn historical_series(store: &Store, locations: Option<&Vec<String>>)
                         -> Result<Vec<SeriesPoint>, StoreError> {
    let snapshot = store.load()?;

    let mut groups: BTreeMap<(NaiveDateTime, String), (f64, usize)> = BTreeMap::new();
    for observation in snapshot {
        if locations.is_some_and(|l| !l.contains(&observation.location)) {
            continue;
        }
        let group = groups
            .entry((observation.observed_at, observation.location))
            .or_insert((0.0, 0));
        group.0 += observation.temperature;
        group.1 += 1;
    }

    let series = groups.into_iter()
        .map(|((observed_at, location), (sum, count))| SeriesPoint {
            observed_at,
            location,
            mean_temperature: sum / count as f64,
        })
        .collect();

    Ok(series)
}
