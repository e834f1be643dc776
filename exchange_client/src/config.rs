//! Client configuration and credential handling.
//!
//! Credentials are an explicit constructor input: the library never reads
//! the environment on its own. Binaries that want `.env` support call
//! `dotenvy::dotenv()` themselves before [`ClientConfig::from_env`].

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::retry::RetryPolicy;

/// Binance Spot testnet REST endpoint.
pub const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "BINANCE_API_KEY";
/// Environment variable holding the API secret.
pub const ENV_API_SECRET: &str = "BINANCE_API_SECRET";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RECV_WINDOW_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Failed to build the underlying HTTP client.
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// API key contains characters that cannot appear in a header value.
    #[error("Invalid API key format")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}

/// Reads an environment variable, returning a structured error if it's missing.
pub fn get_env_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// API key/secret pair. Held in memory only; `Debug` output is redacted
/// by `secrecy` and the values are never logged or persisted.
pub struct Credentials {
    pub api_key: SecretString,
    pub api_secret: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into().into()),
            api_secret: SecretString::new(api_secret.into().into()),
        }
    }

    /// Loads the key pair from `BINANCE_API_KEY` / `BINANCE_API_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: SecretString::new(get_env_var(ENV_API_KEY)?.into()),
            api_secret: SecretString::new(get_env_var(ENV_API_SECRET)?.into()),
        })
    }
}

/// Everything a [`BinanceClient`](crate::BinanceClient) needs, passed in
/// explicitly at construction.
pub struct ClientConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout: Duration,
    /// `recvWindow` sent with signed requests, in milliseconds.
    pub recv_window_ms: u64,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Testnet defaults around an explicit credential pair.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: TESTNET_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            retry: RetryPolicy::default(),
        }
    }

    /// Testnet defaults with credentials read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(Credentials::from_env()?))
    }
}
