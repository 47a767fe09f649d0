use serde::Deserialize;

#[derive(Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

#[derive(Deserialize)]
pub struct ForecastEntry {
    pub dt_txt: String,
    pub main: MainReadings,
    pub wind: Wind,
    pub rain: Option<Rain>,
    pub clouds: Clouds,
    pub weather: Vec<Condition>,
}

#[derive(Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Deserialize)]
pub struct Rain {
    #[serde(rename = "1h", default)]
    pub one_hour: f64,
}

#[derive(Deserialize)]
pub struct Clouds {
    pub all: f64,
}

#[derive(Deserialize)]
pub struct Condition {
    pub main: String,
}
