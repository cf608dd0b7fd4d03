use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// The provider rejects forecast horizons beyond two weeks.
pub const MAX_FORECAST_DAYS: u32 = 14;

/// Longest polling interval accepted: one day.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Where the WeatherAPI key lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretConfig {
    /// Vault-style REST secret store.
    Vault {
        vault_url: String,
        secret_name: String,
        /// Environment variable holding a bearer token for the store.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_env: Option<String>,
    },
    /// Plain environment variable, handy for local runs.
    Env { var: String },
}

impl Default for SecretConfig {
    fn default() -> Self {
        SecretConfig::Vault {
            vault_url: "https://kv-weather-streaming-311.vault.azure.net/".to_string(),
            secret_name: "weatherapikey".to_string(),
            token_env: Some("VAULT_ACCESS_TOKEN".to_string()),
        }
    }
}

/// Where flattened records are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublisherConfig {
    EventHub {
        /// Host name (`https://` is assumed) or full base URL of the namespace.
        namespace: String,
        /// Event hub name the records are sent to.
        channel: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_env: Option<String>,
    },
    /// Print records instead of sending them.
    Stdout,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        PublisherConfig::EventHub {
            namespace: "weatherstreamingnamespace311.servicebus.windows.net".to_string(),
            channel: "weatherstreameventhub".to_string(),
            token_env: Some("EVENT_HUB_ACCESS_TOKEN".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    /// Fire once immediately instead of waiting a full interval.
    pub run_on_startup: bool,
    /// Let a new run start while the previous one is still going.
    pub allow_overlap: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 60, run_on_startup: true, allow_overlap: false }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// location = "Tucson"
/// forecast_days = 3
///
/// [secret]
/// kind = "env"
/// var = "WEATHER_API_KEY"
///
/// [publisher]
/// kind = "stdout"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: String,
    pub forecast_days: u32,
    pub base_url: String,
    pub secret: SecretConfig,
    pub publisher: PublisherConfig,
    pub schedule: ScheduleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: "Tucson".to_string(),
            forecast_days: 3,
            base_url: "http://api.weatherapi.com/v1/".to_string(),
            secret: SecretConfig::default(),
            publisher: PublisherConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate config from `path`, or from the platform config file
    /// when `None`. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        let cfg = Self::read(Some(&path))?;

        cfg.validate().with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Like [`Config::load`] but without validation, so a bad file can still
    /// be opened for editing.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;

        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::config_file_path(),
        }
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the platform config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-stream", "weather-stream")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.location.trim().is_empty() {
            bail!("location must not be empty");
        }
        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast_days) {
            bail!(
                "forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                self.forecast_days
            );
        }
        if !(1..=MAX_INTERVAL_SECS).contains(&self.schedule.interval_secs) {
            bail!(
                "schedule.interval_secs must be between 1 and {MAX_INTERVAL_SECS}, got {}",
                self.schedule.interval_secs
            );
        }
        Ok(())
    }
}
