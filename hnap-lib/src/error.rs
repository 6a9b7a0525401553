use std::time::Duration;

use thiserror::Error;

/// The primary error type for the `hnap-lib` library.
#[derive(Error, Debug)]
pub enum HnapError {
    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Authentication rejected by device during {action}: LoginResult was {result:?}")]
    Authentication { action: String, result: String },

    #[error("Protocol error in {action} response: {reason}")]
    Protocol { action: String, reason: String },

    #[error("Transport error during {action}: {source}")]
    Transport {
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Timed out after {timeout:?} waiting for {action}")]
    Timeout { action: String, timeout: Duration },

    #[error("Invalid device address: {0}")]
    Address(#[from] url::ParseError),
}

impl HnapError {
    pub(crate) fn protocol(action: &str, reason: impl Into<String>) -> Self {
        HnapError::Protocol {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}
