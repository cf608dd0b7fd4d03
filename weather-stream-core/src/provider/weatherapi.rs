use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::truncate_body,
    model::{ApiDocument, Endpoint},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }

    async fn fetch(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> Result<ApiDocument> {
        let url = self.url(endpoint);
        debug!(%endpoint, %url, "requesting WeatherAPI document");

        let res = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if status != StatusCode::OK {
            return Ok(ApiDocument::Degraded(format!(
                "Error {}, {}",
                status.as_u16(),
                truncate_body(&body)
            )));
        }

        let parsed: Value = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))?;

        Ok(ApiDocument::Ok(parsed))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, api_key: &str, location: &str) -> Result<ApiDocument> {
        self.fetch(Endpoint::Current, &[("key", api_key), ("q", location), ("aqi", "yes")]).await
    }

    async fn forecast(&self, api_key: &str, location: &str, days: u32) -> Result<ApiDocument> {
        let days = days.to_string();
        self.fetch(Endpoint::Forecast, &[("key", api_key), ("q", location), ("days", days.as_str())]).await
    }

    async fn alerts(&self, api_key: &str, location: &str) -> Result<ApiDocument> {
        self.fetch(Endpoint::Alerts, &[("key", api_key), ("q", location), ("alerts", "yes")]).await
    }
}
