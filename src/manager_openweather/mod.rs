pub mod errors;

use std::time::Duration;
use chrono::{NaiveDateTime, Utc};
use log::warn;
use ureq::Agent;
use crate::config::Weather;
use crate::manager_openweather::errors::FetchError;
use crate::models::observation::Observation;
use crate::models::openweather::{ForecastEntry, ForecastResponse};

const REQUEST_DOMAIN: &str = "https://api.openweathermap.org";

/// Struct for managing forecast retrieval from the OpenWeatherMap API
pub struct OpenWeather {
    agent: Agent,
    api_key: String,
    units: String,
}

impl OpenWeather {
    /// Returns an OpenWeather struct ready for fetching forecasts
    ///
    /// # Arguments
    ///
    /// * 'config' - the weather section of the configuration
    pub fn new(config: &Weather) -> OpenWeather {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();

        let agent = agent_config.into();

        Self { agent, api_key: config.api_key.to_string(), units: config.units.to_string() }
    }

    /// Retrieves the multi-point forecast for one location and normalizes
    /// each forecast entry into an Observation record
    ///
    /// # Arguments
    ///
    /// * 'location' - name of the location to get a forecast for
    pub fn fetch_forecast(&self, location: &str) -> Result<Vec<Observation>, FetchError> {
        let url = format!("{}/data/2.5/forecast", REQUEST_DOMAIN);

        let json = self.agent
            .get(&url)
            .query("q", location)
            .query("appid", &self.api_key)
            .query("units", &self.units)
            .call()
            .map_err(|e| FetchError::Http { location: location.to_string(), reason: e.to_string() })?
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Http { location: location.to_string(), reason: e.to_string() })?;

        parse_forecast(location, &json, Utc::now().naive_utc())
    }

    /// Fetches forecasts for all given locations in turn. A failed location
    /// is logged and skipped, the result is the union of the successful ones
    /// and may be empty if every location failed.
    ///
    /// # Arguments
    ///
    /// * 'locations' - the locations to fetch forecasts for
    pub fn fetch_all(&self, locations: &Vec<String>) -> Vec<Observation> {
        let mut records: Vec<Observation> = Vec::new();

        for location in locations {
            match self.fetch_forecast(location) {
                Ok(observations) => records.extend(observations),
                Err(e) => warn!("skipping location: {}", e),
            }
        }

        records
    }
}

/// Parses a raw forecast document into Observation records
///
/// # Arguments
///
/// * 'location' - the location the document was fetched for
/// * 'json' - the raw forecast document
/// * 'retrieved_at' - the fetch timestamp to stamp on each record
fn parse_forecast(location: &str, json: &str, retrieved_at: NaiveDateTime)
                  -> Result<Vec<Observation>, FetchError> {

    let response: ForecastResponse = serde_json::from_str(json)
        .map_err(|e| FetchError::Document { location: location.to_string(), reason: e.to_string() })?;

    if response.list.is_empty() {
        return Err(FetchError::Empty { location: location.to_string() });
    }

    response.list.iter()
        .map(|entry| to_observation(location, entry, retrieved_at))
        .collect()
}

/// Maps one forecast entry to an Observation. A missing rain field means
/// no precipitation, not an error.
///
/// # Arguments
///
/// * 'location' - the location the entry belongs to
/// * 'entry' - the forecast entry
/// * 'retrieved_at' - the fetch timestamp to stamp on the record
fn to_observation(location: &str, entry: &ForecastEntry, retrieved_at: NaiveDateTime)
                  -> Result<Observation, FetchError> {

    let observed_at = NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| FetchError::Document {
            location: location.to_string(),
            reason: format!("bad dt_txt '{}': {}", entry.dt_txt, e),
        })?;

    let condition = entry.weather.first()
        .map(|w| w.main.to_string())
        .ok_or_else(|| FetchError::Document {
            location: location.to_string(),
            reason: "missing weather condition".to_string(),
        })?;

    Ok(Observation {
        location: location.to_string(),
        observed_at,
        retrieved_at,
        temperature: entry.main.temp,
        humidity: entry.main.humidity,
        wind_speed: entry.wind.speed,
        pressure: entry.main.pressure,
        precipitation: entry.rain.as_ref().map_or(0.0, |r| r.one_hour),
        cloud_coverage: entry.clouds.all,
        condition,
    })
}
