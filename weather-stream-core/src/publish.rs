use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use std::fmt::Debug;
use tracing::debug;

use crate::{
    config::PublisherConfig,
    error::{CollaboratorError, truncate_body},
    model::FlatRecord,
    secret::bearer_token,
};

/// Content type the Event Hubs REST send endpoint expects for a single event.
const EVENT_CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";

#[async_trait]
pub trait EventPublisher: Send + Sync + Debug {
    /// Send one record. Returns once the destination has accepted it.
    async fn publish(&self, record: &FlatRecord) -> Result<()>;
}

/// Sends each record as one event through the Event Hubs REST interface:
/// `POST {namespace}/{channel}/messages`.
#[derive(Debug, Clone)]
pub struct EventHubPublisher {
    endpoint: String,
    token_env: Option<String>,
    http: Client,
}

impl EventHubPublisher {
    pub fn new(namespace: &str, channel: &str, token_env: Option<String>) -> Self {
        let base = if namespace.contains("://") {
            namespace.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", namespace.trim_end_matches('/'))
        };

        Self { endpoint: format!("{base}/{channel}/messages"), token_env, http: Client::new() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventPublisher for EventHubPublisher {
    async fn publish(&self, record: &FlatRecord) -> Result<()> {
        let payload = serde_json::to_string(record).context("Failed to serialize record")?;
        debug!(endpoint = %self.endpoint, %payload, "sending event");

        let mut req =
            self.http.post(&self.endpoint).header(CONTENT_TYPE, EVENT_CONTENT_TYPE).body(payload);
        if let Some(token) = bearer_token(self.token_env.as_deref())? {
            req = req.bearer_auth(token);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("Failed to send event to {}", self.endpoint))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CollaboratorError::PublishRejected {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body: truncate_body(&body),
            }
            .into());
        }

        Ok(())
    }
}

/// Prints records as pretty JSON instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct StdoutPublisher;

#[async_trait]
impl EventPublisher for StdoutPublisher {
    async fn publish(&self, record: &FlatRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
        println!("{json}");
        Ok(())
    }
}

pub fn publisher_from_config(config: &PublisherConfig) -> Box<dyn EventPublisher> {
    match config {
        PublisherConfig::EventHub { namespace, channel, token_env } => {
            Box::new(EventHubPublisher::new(namespace, channel, token_env.clone()))
        }
        PublisherConfig::Stdout => Box::new(StdoutPublisher),
    }
}
