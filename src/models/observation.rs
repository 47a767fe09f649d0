use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One normalized forecast reading, one row in the record store.
/// Field order is the store's column order.
#[derive(Clone, Serialize, Deserialize)]
pub struct Observation {
    pub location: String,
    pub observed_at: NaiveDateTime,
    pub retrieved_at: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub precipitation: f64,
    pub cloud_coverage: f64,
    pub condition: String,
}
