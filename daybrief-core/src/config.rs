use anyhow::{Context, Result, anyhow, bail};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{model::City, notifier, provider::openmeteo};

pub const ENV_BOT_TOKEN: &str = "DAYBRIEF_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "DAYBRIEF_CHAT_ID";
pub const ENV_TIMEZONE: &str = "DAYBRIEF_TIMEZONE";

/// Forecast API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: openmeteo::DEFAULT_BASE_URL.to_string(),
            timeout_secs: openmeteo::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Telegram bot settings. Token and chat id usually come from the
/// environment on servers and from `daybrief configure` on desktops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: notifier::DEFAULT_API_BASE.to_string(),
            bot_token: None,
            chat_id: None,
            timeout_secs: notifier::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timezone = "Asia/Taipei"
///
/// [telegram]
/// bot_token = "..."
/// chat_id = "..."
///
/// [[cities]]
/// name = "Taoyuan"
/// latitude = 24.9936
/// longitude = 121.3010
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA zone used for the forecast request and the report date.
    pub timezone: String,
    /// Pause between consecutive city fetches.
    pub pacing_ms: u64,
    pub forecast: ForecastConfig,
    pub telegram: TelegramConfig,
    pub cities: Vec<City>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "Asia/Taipei".to_string(),
            pacing_ms: 500,
            forecast: ForecastConfig::default(),
            telegram: TelegramConfig::default(),
            cities: default_cities(),
        }
    }
}

pub fn default_cities() -> Vec<City> {
    vec![City::new("Taoyuan", 24.9936, 121.3010), City::new("Taichung", 24.1477, 120.6736)]
}

impl Config {
    /// Load config from `path`, or from the platform config file when `None`.
    /// A missing platform file yields defaults; a missing explicit `path` is an
    /// error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path.filter(|p| !p.exists()) {
            bail!("Config file not found: {}", p.display());
        }
        let path = Self::resolve_path(path)?;

        let mut cfg = Self::load_file(&path)?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read just the file, without environment overrides or validation.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, defaults only.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to `path` (or the platform config file), creating parent directories as needed.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// `path` if given, otherwise the platform config file.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::config_file_path(),
        }
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "daybrief", "daybrief")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the environment; `lookup` is `std::env::var` outside tests.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = non_empty(ENV_CHAT_ID) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(tz) = non_empty(ENV_TIMEZONE) {
            self.timezone = tz;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.cities.is_empty() {
            bail!("No cities configured; add at least one [[cities]] entry.");
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| anyhow!("Unknown timezone '{}'; expected an IANA name like Asia/Taipei.", self.timezone))
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn forecast_timeout(&self) -> Duration {
        Duration::from_secs(self.forecast.timeout_secs)
    }

    pub fn telegram_timeout(&self) -> Duration {
        Duration::from_secs(self.telegram.timeout_secs)
    }

    /// Convenience helper: set/replace the bot credentials.
    pub fn set_telegram_credentials(&mut self, bot_token: String, chat_id: String) {
        self.telegram.bot_token = Some(bot_token);
        self.telegram.chat_id = Some(chat_id);
    }

    /// Returns `(bot_token, chat_id)`, or a hint on how to provide them.
    pub fn telegram_credentials(&self) -> Result<(&str, &str)> {
        let token = self.telegram.bot_token.as_deref().ok_or_else(|| {
            anyhow!(
                "No Telegram bot token configured.\n\
                 Hint: run `daybrief configure` or set {ENV_BOT_TOKEN}."
            )
        })?;
        let chat_id = self.telegram.chat_id.as_deref().ok_or_else(|| {
            anyhow!(
                "No Telegram chat id configured.\n\
                 Hint: run `daybrief configure` or set {ENV_CHAT_ID}."
            )
        })?;
        Ok((token, chat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_cover_two_cities_in_taipei_time() {
        let cfg = Config::default();

        let names: Vec<_> = cfg.cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Taoyuan", "Taichung"]);
        assert_eq!(cfg.tz().expect("valid default tz"), chrono_tz::Asia::Taipei);
        assert_eq!(cfg.pacing(), Duration::from_millis(500));
        assert_eq!(cfg.forecast_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.telegram_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn credentials_error_when_missing() {
        let cfg = Config::default();
        let err = cfg.telegram_credentials().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No Telegram bot token configured"));
        assert!(msg.contains("Hint: run `daybrief configure`"));
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_telegram_credentials("FILE_TOKEN".into(), "FILE_CHAT".into());

        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_BOT_TOKEN, "ENV_TOKEN"), (ENV_CHAT_ID, "  ")]);
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        let (token, chat) = cfg.telegram_credentials().expect("credentials present");
        assert_eq!(token, "ENV_TOKEN");
        assert_eq!(chat, "FILE_CHAT");
        assert_eq!(cfg.timezone, "Asia/Taipei");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            timezone = "Europe/Berlin"

            [[cities]]
            name = "Berlin"
            latitude = 52.52
            longitude = 13.405
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.tz().expect("valid tz"), chrono_tz::Europe::Berlin);
        assert_eq!(cfg.cities, vec![City::new("Berlin", 52.52, 13.405)]);
        assert_eq!(cfg.pacing_ms, 500);
        assert_eq!(cfg.forecast.base_url, openmeteo::DEFAULT_BASE_URL);
    }

    #[test]
    fn validate_rejects_bad_timezone_and_empty_cities() {
        let mut cfg = Config { timezone: "Mars/Olympus".into(), ..Config::default() };
        assert!(cfg.validate().unwrap_err().to_string().contains("Unknown timezone"));

        cfg.timezone = "UTC".into();
        cfg.cities.clear();
        assert!(cfg.validate().unwrap_err().to_string().contains("No cities configured"));
    }

    #[test]
    fn save_then_load_preserves_credentials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_telegram_credentials("TOKEN".into(), "CHAT".into());
        cfg.save(Some(&path)).expect("save works");

        let loaded = Config::load_file(&path).expect("load works");
        assert_eq!(loaded.telegram.bot_token.as_deref(), Some("TOKEN"));
        assert_eq!(loaded.cities, cfg.cities);
    }

    #[test]
    fn load_rejects_missing_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("typo.toml");

        let err = Config::load(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("Config file not found"), "{err}");
        assert!(err.to_string().contains("typo.toml"), "{err}");
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[[cities]]\nname = \"Berlin\"\nlatitude = 52.52\nlongitude = 13.405\n",
        )
        .expect("write config");

        let cfg = Config::load(Some(&path)).expect("loads");

        assert_eq!(cfg.cities, vec![City::new("Berlin", 52.52, 13.405)]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_file(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(cfg.cities, default_cities());
    }
}
