use crate::model::ApiDocument;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// The three reads a run makes against the weather provider.
///
/// A non-200 answer is not an error: it comes back as
/// [`ApiDocument::Degraded`]. `Err` is reserved for transport failures and
/// unreadable bodies, which abort the run.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions, including the air-quality block.
    async fn current(&self, api_key: &str, location: &str) -> anyhow::Result<ApiDocument>;

    async fn forecast(&self, api_key: &str, location: &str, days: u32)
    -> anyhow::Result<ApiDocument>;

    async fn alerts(&self, api_key: &str, location: &str) -> anyhow::Result<ApiDocument>;
}
