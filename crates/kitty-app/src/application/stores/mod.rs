//! UI-side state owned by the application context.
//!
//! Persisted stores write through to [`KeyValueStorage`] on every update.
//!
//! [`KeyValueStorage`]: kitty_domain::setting::KeyValueStorage

mod log_queue;
mod proxy_store;
mod setting_store;
mod subscription_store;

pub use log_queue::{LogQueue, DEFAULT_LOG_CAPACITY};
pub use proxy_store::{ProxyStore, PROXY_KEY};
pub use setting_store::{SettingStore, SETTING_KEY};
pub use subscription_store::{LoadingGuard, SubscriptionStore};

use kitty_domain::setting::KeyValueStorage;
use kitty_domain::DomainError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Read a persisted document, falling back to defaults when it is missing
/// or no longer matches the record shape
fn load_or_default<T>(storage: &dyn KeyValueStorage, key: &str) -> Result<T, DomainError>
where
    T: DeserializeOwned + Default,
{
    match storage.load(key)? {
        None => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "Stored record unreadable, using defaults");
            T::default()
        })),
    }
}

fn persist<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, value: &T) -> Result<(), DomainError> {
    let value =
        serde_json::to_value(value).map_err(|e| DomainError::Serialization(e.to_string()))?;
    storage.save(key, value)
}
