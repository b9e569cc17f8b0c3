//! The remote call boundary.
//!
//! Everything the UI side needs from the native backend goes through
//! [`BackendCaller::call`]. Callers never see which transport carried the call.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::shared::DomainError;

mod envelope;

pub use envelope::KittyResponse;

/// Named arguments of a backend command
pub type CallArgs = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// The request never produced a reply (connection refused, timeout, HTTP error status)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend replied with a non-zero status code
    #[error("Backend error {code}: {message}")]
    Backend { code: i32, message: String },

    /// The reply could not be interpreted
    #[error("Decode error: {0}")]
    Decode(String),

    /// No handler is registered for the command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl From<CallError> for DomainError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(msg) => DomainError::BackendUnavailable(msg),
            CallError::Backend { code, message } => {
                DomainError::BackendRejected(format!("[{code}] {message}"))
            }
            CallError::Decode(msg) => DomainError::Deserialization(msg),
            CallError::UnknownCommand(cmd) => DomainError::UnknownCommand(cmd),
        }
    }
}

/// Narrow interface to the backend process
#[async_trait]
pub trait BackendCaller: Send + Sync {
    /// Invoke `command` with `args`, returning the unwrapped `data` payload
    async fn call(&self, command: &str, args: CallArgs) -> Result<Value, CallError>;
}

/// Build [`CallArgs`] from `(name, value)` pairs
pub fn args<I, K>(pairs: I) -> CallArgs
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Decode a call payload into a typed value
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CallError> {
    serde_json::from_value(value).map_err(|e| CallError::Decode(e.to_string()))
}

/// Encode a typed value for use as a call argument
pub fn encode<T: Serialize>(value: &T) -> Result<Value, CallError> {
    serde_json::to_value(value).map_err(|e| CallError::Decode(e.to_string()))
}
