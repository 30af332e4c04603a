use std::env;

use crate::client::IpamClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub bind_address: String,
    /// Mira session settings.
    pub client: ClientConfig,
}

impl Config {
    /// Creates Config from environment variables with defaults.
    ///
    /// Fails if the Mira credentials or user-agent are missing.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8202".into()),
            client: ClientConfig::from_env()?,
        })
    }
}

/// Shared application state passed to all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Mira client, shared by every request.
    pub client: IpamClient,
}

impl AppState {
    pub fn new(client: IpamClient) -> Self {
        Self { client }
    }
}
