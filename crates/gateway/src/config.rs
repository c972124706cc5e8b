//! Adapter configuration
//!
//! JSON-backed construction options. Keys match the venue client's
//! conventional camelCase names so existing config files load unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const LIVE_BASE_URI: &str = "www.bitmex.com";
const TEST_BASE_URI: &str = "testnet.bitmex.com";

fn default_push_queue_capacity() -> usize {
    1024
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unsupported proxy scheme: {0}")]
    InvalidProxy(String),
}

/// Construction options for a venue adapter
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExchangeConfig {
    pub api_key: String,
    pub password: String,
    pub secret: String,
    /// Request deadline in seconds, 0 leaves it to the transport
    pub timeout: u64,
    pub enable_rate_limit: bool,
    /// Route to the sandbox endpoint
    pub test: bool,
    pub verbose: bool,
    /// Enables the push-channel capability; fixed for the adapter's lifetime
    pub websocket: bool,
    /// `socks5:host:port` or `http://host:port`
    pub proxy: String,
    /// Bound of each subscription's delivery queue
    #[serde(default = "default_push_queue_capacity")]
    pub push_queue_capacity: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            password: String::new(),
            secret: String::new(),
            timeout: 0,
            enable_rate_limit: false,
            test: false,
            verbose: false,
            websocket: false,
            proxy: String::new(),
            push_queue_capacity: default_push_queue_capacity(),
        }
    }
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("api_key", &self.api_key)
            .field("password", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("enable_rate_limit", &self.enable_rate_limit)
            .field("test", &self.test)
            .field("verbose", &self.verbose)
            .field("websocket", &self.websocket)
            .field("proxy", &self.proxy)
            .field("push_queue_capacity", &self.push_queue_capacity)
            .finish()
    }
}

impl ExchangeConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_enable_rate_limit(mut self, enable: bool) -> Self {
        self.enable_rate_limit = enable;
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_websocket(mut self, websocket: bool) -> Self {
        self.websocket = websocket;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = proxy.into();
        self
    }

    pub fn with_push_queue_capacity(mut self, capacity: usize) -> Self {
        self.push_queue_capacity = capacity;
        self
    }

    /// Host of the REST/websocket endpoint
    pub fn base_uri(&self) -> &'static str {
        if self.test { TEST_BASE_URI } else { LIVE_BASE_URI }
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    /// Resolve the proxy string into a transport type
    pub fn proxy_kind(&self) -> Result<Proxy, ConfigError> {
        Proxy::parse(&self.proxy)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.proxy_kind()?;
        Ok(())
    }

    /// Everything needed to build a transport for this config
    pub fn transport_settings(&self) -> Result<TransportSettings, ConfigError> {
        Ok(TransportSettings {
            base_uri: self.base_uri().to_string(),
            api_key: self.api_key.clone(),
            secret: self.secret.clone(),
            password: self.password.clone(),
            timeout: self.timeout_duration(),
            enable_rate_limit: self.enable_rate_limit,
            verbose: self.verbose,
            proxy: self.proxy_kind()?,
        })
    }
}

/// Outbound proxy selected by the config's scheme prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proxy {
    None,
    /// `host:port` of a SOCKS5 proxy
    Socks5(String),
    /// Full URL of an HTTP proxy
    Http(String),
}

impl Proxy {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Proxy::None);
        }

        if raw.starts_with("socks5") {
            let addr = raw
                .strip_prefix("socks5://")
                .or_else(|| raw.strip_prefix("socks5:"))
                .ok_or_else(|| ConfigError::InvalidProxy(raw.to_string()))?;
            return Ok(Proxy::Socks5(addr.to_string()));
        }

        if raw.starts_with("http://") {
            return Ok(Proxy::Http(raw.to_string()));
        }

        Err(ConfigError::InvalidProxy(raw.to_string()))
    }
}

/// Connection parameters handed to whoever constructs the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub base_uri: String,
    pub api_key: String,
    pub secret: String,
    pub password: String,
    pub timeout: Option<Duration>,
    pub enable_rate_limit: bool,
    pub verbose: bool,
    pub proxy: Proxy,
}
