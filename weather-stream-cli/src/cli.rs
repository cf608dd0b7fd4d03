use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use weather_stream_core::{Config, Pipeline, Scheduler, config::MAX_FORECAST_DAYS};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-stream", version, about = "Stream WeatherAPI.com snapshots as events")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run on the configured interval until Ctrl-C.
    Run,

    /// Run a single cycle and exit.
    Once,

    /// Fetch and flatten, print the records, publish nothing.
    Preview,

    /// Interactively edit and save the configuration.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = match self.command {
            // Unvalidated so a broken file can be repaired; prompt_config validates.
            Command::Configure => Config::read(self.config.as_deref())?,
            _ => Config::load(self.config.as_deref())?,
        };

        match self.command {
            Command::Run => {
                let pipeline = Arc::new(Pipeline::from_config(&config));
                let scheduler = Scheduler::from(&config.schedule);
                let shutdown = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {e}");
                    }
                };

                let stats = scheduler.run_until(pipeline, shutdown).await;
                info!(
                    runs = stats.started,
                    skipped = stats.skipped,
                    past_due = stats.past_due,
                    "weather-stream stopped"
                );
            }
            Command::Once => {
                let report = Pipeline::from_config(&config).run_once().await?;
                println!(
                    "Published {} record(s) for {}{}",
                    report.published,
                    config.location,
                    if report.degraded.is_empty() {
                        String::new()
                    } else {
                        let names: Vec<_> = report.degraded.iter().map(|e| e.as_str()).collect();
                        format!(" (degraded: {})", names.join(", "))
                    }
                );
            }
            Command::Preview => {
                let records = Pipeline::from_config(&config).preview().await?;
                let json = serde_json::to_string_pretty(&records)
                    .context("Failed to serialize preview records")?;
                println!("{json}");
            }
            Command::Configure => {
                let path = match self.config {
                    Some(p) => p,
                    None => Config::config_file_path()?,
                };
                let updated = prompt_config(config)?;
                updated.save(&path)?;
                println!("Saved configuration to {}", path.display());
            }
        }

        Ok(())
    }
}

fn prompt_config(mut config: Config) -> Result<Config> {
    config.location = Text::new("Location:")
        .with_default(&config.location)
        .with_help_message("Any query WeatherAPI.com accepts: city, postcode, lat,lon")
        .prompt()?;

    config.forecast_days = CustomType::<u32>::new("Forecast days:")
        .with_default(config.forecast_days)
        .with_error_message("Please enter a whole number")
        .with_help_message(&format!("1 to {MAX_FORECAST_DAYS}"))
        .prompt()?;

    config.schedule.interval_secs = CustomType::<u64>::new("Polling interval (seconds):")
        .with_default(config.schedule.interval_secs)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    config.schedule.allow_overlap = Confirm::new("Allow overlapping runs?")
        .with_default(config.schedule.allow_overlap)
        .prompt()?;

    config.validate()?;
    Ok(config)
}
