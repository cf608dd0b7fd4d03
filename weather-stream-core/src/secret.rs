use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    config::SecretConfig,
    error::{CollaboratorError, truncate_body},
};

/// REST API version for vault secret reads.
const VAULT_API_VERSION: &str = "7.4";

#[async_trait]
pub trait SecretProvider: Send + Sync + Debug {
    /// Resolve the current value of the named secret.
    async fn resolve(&self) -> Result<String>;
}

/// Reads a bearer token from the named environment variable, if one is configured.
pub(crate) fn bearer_token(token_env: Option<&str>) -> Result<Option<String>> {
    match token_env {
        None => Ok(None),
        Some(var) => std::env::var(var)
            .map(Some)
            .map_err(|_| CollaboratorError::MissingToken(var.to_string()).into()),
    }
}

/// Fetches a secret from a vault-style REST store:
/// `GET {vault_url}/secrets/{name}?api-version=7.4` → `{"value": "..."}`.
#[derive(Debug, Clone)]
pub struct VaultSecretProvider {
    vault_url: String,
    secret_name: String,
    token_env: Option<String>,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct VaultSecret {
    value: String,
}

impl VaultSecretProvider {
    pub fn new(vault_url: String, secret_name: String, token_env: Option<String>) -> Self {
        Self { vault_url, secret_name, token_env, http: Client::new() }
    }

    fn secret_url(&self) -> String {
        format!("{}/secrets/{}", self.vault_url.trim_end_matches('/'), self.secret_name)
    }
}

#[async_trait]
impl SecretProvider for VaultSecretProvider {
    async fn resolve(&self) -> Result<String> {
        let mut req = self.http.get(self.secret_url()).query(&[("api-version", VAULT_API_VERSION)]);
        if let Some(token) = bearer_token(self.token_env.as_deref())? {
            req = req.bearer_auth(token);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("Failed to reach secret store at {}", self.vault_url))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read secret store response body")?;

        if !status.is_success() {
            return Err(CollaboratorError::SecretUnavailable {
                name: self.secret_name.clone(),
                reason: format!("status {}: {}", status, truncate_body(&body)),
            }
            .into());
        }

        let secret: VaultSecret =
            serde_json::from_str(&body).context("Failed to parse secret store JSON")?;

        Ok(secret.value)
    }
}

/// Takes the secret straight from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    var: String,
}

impl EnvSecretProvider {
    pub fn new(var: String) -> Self {
        Self { var }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn resolve(&self) -> Result<String> {
        std::env::var(&self.var).map_err(|e| {
            CollaboratorError::SecretUnavailable { name: self.var.clone(), reason: e.to_string() }
                .into()
        })
    }
}

pub fn secret_provider_from_config(config: &SecretConfig) -> Box<dyn SecretProvider> {
    match config {
        SecretConfig::Vault { vault_url, secret_name, token_env } => Box::new(
            VaultSecretProvider::new(vault_url.clone(), secret_name.clone(), token_env.clone()),
        ),
        SecretConfig::Env { var } => Box::new(EnvSecretProvider::new(var.clone())),
    }
}
