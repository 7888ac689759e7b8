use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    config::Config,
    format::{render_city_block, render_report},
    model::City,
    notifier::{Delivery, Notifier},
    provider::{OpenMeteoProvider, WeatherProvider},
};

/// What one run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub message: String,
    /// `None` for dry runs.
    pub delivery: Option<Delivery>,
    pub failed_cities: Vec<String>,
}

/// The fetch → format → send pipeline for a fixed list of cities.
#[derive(Debug)]
pub struct Briefing {
    provider: Box<dyn WeatherProvider>,
    cities: Vec<City>,
    pacing: Duration,
    tz: Tz,
}

impl Briefing {
    pub fn new(provider: Box<dyn WeatherProvider>, cities: Vec<City>, pacing: Duration, tz: Tz) -> Self {
        Self { provider, cities, pacing, tz }
    }

    /// Build a briefing backed by Open-Meteo from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = OpenMeteoProvider::new(
            config.forecast.base_url.clone(),
            config.timezone.clone(),
            config.forecast_timeout(),
        )?;

        Ok(Self::new(Box::new(provider), config.cities.clone(), config.pacing(), config.tz()?))
    }

    /// Fetch and render every city in order. Returns the blocks and the names
    /// of cities whose fetch failed.
    pub async fn collect_blocks(&self) -> (Vec<String>, Vec<String>) {
        let mut blocks = Vec::with_capacity(self.cities.len());
        let mut failed = Vec::new();

        for (idx, city) in self.cities.iter().enumerate() {
            if idx > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            info!(city = %city.name, "fetching weather");
            let result = self.provider.get_weather(city).await;
            if let Err(err) = &result {
                warn!(city = %city.name, error = %err, "weather unavailable");
                failed.push(city.name.clone());
            }

            blocks.push(render_city_block(city, &result));
        }

        (blocks, failed)
    }

    /// Fetch all cities and compose the full message dated `now`.
    pub async fn compose(&self, now: DateTime<Utc>) -> (String, Vec<String>) {
        let (blocks, failed) = self.collect_blocks().await;
        let local = now.with_timezone(&self.tz);
        (render_report(&local, &blocks), failed)
    }

    /// Compose and, unless `notifier` is `None`, deliver.
    pub async fn run(&self, notifier: Option<&dyn Notifier>) -> RunSummary {
        let (message, failed_cities) = self.compose(Utc::now()).await;

        let delivery = match notifier {
            Some(n) => {
                info!("sending message");
                let delivery = n.send(&message).await;
                if delivery.success {
                    info!(status = %delivery.message, "delivered");
                } else {
                    warn!(status = %delivery.message, "delivery failed");
                }
                Some(delivery)
            }
            None => None,
        };

        RunSummary { message, delivery, failed_cities }
    }
}
