//! Core library for the `weather-stream` job.
//!
//! This crate defines:
//! - Defensive access and coercion over WeatherAPI.com JSON
//! - The flattening of current/forecast/alerts documents into per-day records
//! - Collaborator seams: weather provider, secret store, event publisher
//! - The run pipeline and its fixed-interval scheduler
//! - Configuration handling
//!
//! It is used by `weather-stream-cli`, but can also be embedded in other hosts
//! that bring their own trigger.

pub mod access;
pub mod coerce;
pub mod combine;
pub mod config;
pub mod error;
pub mod flatten;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod publish;
pub mod scheduler;
pub mod secret;

pub use config::{Config, PublisherConfig, ScheduleConfig, SecretConfig};
pub use error::CollaboratorError;
pub use flatten::flatten;
pub use model::{ApiDocument, Endpoint, FlatRecord};
pub use pipeline::{Pipeline, RunReport, RunSettings};
pub use provider::{WeatherApiProvider, WeatherProvider};
pub use publish::{EventHubPublisher, EventPublisher, StdoutPublisher};
pub use scheduler::{Scheduler, SchedulerStats};
pub use secret::{EnvSecretProvider, SecretProvider, VaultSecretProvider};
