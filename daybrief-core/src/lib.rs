//! Core library for the `daybrief` notifier.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The Open-Meteo weather provider and WMO code lookup
//! - Rendering of the daily report
//! - Delivery through the Telegram Bot API
//!
//! It is used by `daybrief-cli`, but the [`Briefing`] pipeline can be driven
//! from any async context.

pub mod briefing;
pub mod config;
pub mod format;
pub mod model;
pub mod notifier;
pub mod provider;
pub mod weather_code;

pub use briefing::{Briefing, RunSummary};
pub use config::Config;
pub use model::{City, CityWeather, CurrentConditions, DaySlot, HourlySample, SlotForecast};
pub use notifier::{Delivery, Notifier, TelegramNotifier};
pub use provider::{FetchError, OpenMeteoProvider, WeatherProvider};
