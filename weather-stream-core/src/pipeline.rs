//! One collection cycle: resolve the API key, fetch the three documents,
//! flatten them and publish every record in order.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    flatten::flatten,
    model::{ApiDocument, Endpoint, FlatRecord},
    provider::{WeatherApiProvider, WeatherProvider},
    publish::{EventPublisher, publisher_from_config},
    secret::{SecretProvider, secret_provider_from_config},
};

/// What a run asks the provider for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub location: String,
    pub forecast_days: u32,
}

impl From<&Config> for RunSettings {
    fn from(config: &Config) -> Self {
        Self { location: config.location.clone(), forecast_days: config.forecast_days }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub published: usize,
    /// Endpoints that answered with a non-200 status this run.
    pub degraded: Vec<Endpoint>,
}

#[derive(Debug)]
struct Snapshot {
    current: ApiDocument,
    forecast: ApiDocument,
    alerts: ApiDocument,
}

impl Snapshot {
    fn document(&self, endpoint: Endpoint) -> &ApiDocument {
        match endpoint {
            Endpoint::Current => &self.current,
            Endpoint::Forecast => &self.forecast,
            Endpoint::Alerts => &self.alerts,
        }
    }

    fn documents(&self) -> impl Iterator<Item = (Endpoint, &ApiDocument)> {
        Endpoint::all().iter().map(|&endpoint| (endpoint, self.document(endpoint)))
    }

    fn degraded(&self) -> Vec<Endpoint> {
        self.documents()
            .filter(|(_, doc)| doc.is_degraded())
            .map(|(endpoint, _)| endpoint)
            .collect()
    }

    fn flatten(&self) -> Vec<FlatRecord> {
        flatten(&self.current, &self.forecast, &self.alerts)
    }
}

/// The collaborators are built once and shared by every run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: RunSettings,
    weather: Arc<dyn WeatherProvider>,
    secrets: Arc<dyn SecretProvider>,
    publisher: Arc<dyn EventPublisher>,
}

impl Pipeline {
    pub fn new(
        settings: RunSettings,
        weather: Arc<dyn WeatherProvider>,
        secrets: Arc<dyn SecretProvider>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { settings, weather, secrets, publisher }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RunSettings::from(config),
            Arc::new(WeatherApiProvider::new(config.base_url.clone())),
            Arc::from(secret_provider_from_config(&config.secret)),
            Arc::from(publisher_from_config(&config.publisher)),
        )
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    async fn collect(&self) -> Result<Snapshot> {
        let api_key = self.secrets.resolve().await.context("Failed to resolve WeatherAPI key")?;
        let RunSettings { location, forecast_days } = &self.settings;

        let current = self.weather.current(&api_key, location).await?;
        let forecast = self.weather.forecast(&api_key, location, *forecast_days).await?;
        let alerts = self.weather.alerts(&api_key, location).await?;

        let snapshot = Snapshot { current, forecast, alerts };
        for (endpoint, doc) in snapshot.documents() {
            if let Some(reason) = doc.degraded_reason() {
                warn!(%endpoint, %reason, "WeatherAPI document degraded, continuing without it");
            }
        }

        Ok(snapshot)
    }

    /// Fetch and flatten without publishing anything.
    pub async fn preview(&self) -> Result<Vec<FlatRecord>> {
        Ok(self.collect().await?.flatten())
    }

    /// Run one cycle. Publishing stops at the first failed record; records
    /// already sent stay sent.
    pub async fn run_once(&self) -> Result<RunReport> {
        let snapshot = self.collect().await?;
        let records = snapshot.flatten();

        let mut report = RunReport { published: 0, degraded: snapshot.degraded() };
        for record in &records {
            self.publisher.publish(record).await.with_context(|| {
                format!(
                    "Failed to publish record {} of {} ({})",
                    report.published + 1,
                    records.len(),
                    record.forecast_key
                )
            })?;
            report.published += 1;
        }

        info!(
            location = %self.settings.location,
            published = report.published,
            degraded = report.degraded.len(),
            "weather run finished"
        );
        Ok(report)
    }

    /// Scheduled entry point: runs one cycle and logs any failure instead of
    /// returning it.
    pub async fn fire(&self, past_due: bool) -> Option<RunReport> {
        if past_due {
            info!("The timer is past due!");
        }

        match self.run_once().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("weather run failed: {e:#}");
                None
            }
        }
    }
}
