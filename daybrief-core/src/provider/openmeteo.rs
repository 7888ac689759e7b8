use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::model::{City, CityWeather, CurrentConditions, HourlySample, select_slots};

use super::{FetchError, WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";

/// Fetches today's conditions from the Open-Meteo forecast API.
///
/// Timestamps come back in `timezone` local time, so the hourly series can be
/// matched against wall-clock slots without conversion.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    timezone: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(
        base_url: impl Into<String>,
        timezone: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self { base_url: base_url.into(), timezone: timezone.into(), http })
    }

    async fn fetch(&self, city: &City) -> Result<OmResponse, FetchError> {
        let query = [
            ("latitude", city.latitude.to_string()),
            ("longitude", city.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", self.timezone.clone()),
            ("temperature_unit", "celsius".to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("forecast_days", "1".to_string()),
        ];

        debug!(url = %self.base_url, lat = city.latitude, lon = city.longitude, "requesting forecast");

        let res = self.http.get(&self.base_url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self, city), fields(city = %city.name), level = "debug")]
    async fn get_weather(&self, city: &City) -> Result<CityWeather, FetchError> {
        let parsed = self.fetch(city).await?;
        parsed.into_city_weather()
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: u8,
    apparent_temperature: f64,
    weather_code: i32,
    wind_speed_10m: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
    #[serde(default)]
    hourly: OmHourly,
}

impl OmResponse {
    fn into_city_weather(self) -> Result<CityWeather, FetchError> {
        let current = CurrentConditions {
            temperature_c: self.current.temperature_2m,
            feels_like_c: self.current.apparent_temperature,
            humidity_pct: self.current.relative_humidity_2m,
            wind_speed_kmh: self.current.wind_speed_10m,
            weather_code: self.current.weather_code,
            observed_at: parse_local_time(&self.current.time)?,
        };

        let mut samples = Vec::with_capacity(self.hourly.time.len());
        for ((time, temp), code) in self
            .hourly
            .time
            .iter()
            .zip(&self.hourly.temperature_2m)
            .zip(&self.hourly.weather_code)
        {
            // Open-Meteo reports gaps as null; those hours just don't exist for us.
            let Some(temperature_c) = *temp else { continue };
            samples.push(HourlySample {
                time: parse_local_time(time)?,
                temperature_c,
                weather_code: code.unwrap_or(-1),
            });
        }

        let forecast = select_slots(current.observed_at.date(), &samples);

        Ok(CityWeather { current, forecast })
    }
}

/// Open-Meteo emits ISO 8601 local times without an offset, usually minute precision.
fn parse_local_time(s: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| FetchError::Parse(format!("invalid timestamp '{s}'")))
}
