use anyhow::Context;
use clap::{Parser, Subcommand};
use daybrief_core::{Briefing, Config, Notifier, TelegramNotifier, format::strip_markup};
use inquire::{Password, PasswordDisplayMode, Text};
use std::path::PathBuf;
use tracing::{info, warn};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "daybrief", version, about = "Daily weather briefing for Telegram")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch today's weather and send the briefing.
    Run {
        /// Config file; defaults to the platform config directory.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Compose and preview the message without sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Store Telegram bot credentials in the config file.
    Configure {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the default config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run { config, dry_run } => run_briefing(config, dry_run).await,
            Command::Configure { config } => configure(config),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn run_briefing(config_path: Option<PathBuf>, dry_run: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path.as_deref())?;

    let notifier = if dry_run {
        info!("dry run, message will not be sent");
        None
    } else {
        let (token, chat_id) = config.telegram_credentials()?;
        Some(TelegramNotifier::new(
            config.telegram.api_base.clone(),
            token,
            chat_id,
            config.telegram_timeout(),
        )?)
    };

    let briefing = Briefing::from_config(&config)?;
    info!(cities = config.cities.len(), "fetching weather");

    let summary = briefing.run(notifier.as_ref().map(|n| n as &dyn Notifier)).await;

    if !summary.failed_cities.is_empty() {
        warn!(cities = ?summary.failed_cities, "some cities are missing weather data");
    }
    match &summary.delivery {
        Some(d) if d.success => println!("✅ {}", d.message),
        Some(d) => println!("❌ {}", d.message),
        None => {}
    }

    println!("\nMessage preview:");
    println!("{}", "-".repeat(50));
    println!("{}", strip_markup(&summary.message));

    Ok(())
}

fn configure(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Environment overrides stay out of the saved file.
    let path = Config::resolve_path(config_path.as_deref())?;
    let mut config = Config::load_file(&path)?;

    let bot_token = Password::new("Telegram bot token:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read bot token")?;

    let chat_id = Text::new("Chat id:")
        .with_initial_value(config.telegram.chat_id.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read chat id")?;

    config.set_telegram_credentials(bot_token.trim().to_string(), chat_id.trim().to_string());
    let saved = config.save(Some(&path))?;

    println!("Saved configuration to {}", saved.display());
    Ok(())
}
