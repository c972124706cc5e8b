//! Error types for the gateway crate

use thiserror::Error;

use crate::config::ConfigError;

/// Transport-level errors
///
/// Produced by the venue connection; adapters pass them through untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("Subscription failed: {0}")]
    Subscribe(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Timeout waiting for response")]
    Timeout,
}

/// Gateway-level errors (adapter operations)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Push-channel operation on an instance built with push channels off
    #[error("websocket disabled")]
    PushDisabled,

    #[error("Message conversion error: {0}")]
    Conversion(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
