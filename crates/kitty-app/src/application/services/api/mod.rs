//! Typed wrappers over the backend commands.
//!
//! Each call shapes its arguments for the backend, issues one command and
//! maps the reply back to the UI shape.

mod proxy_api;
mod rule_api;
mod subscription_api;

pub use proxy_api::{ProxyApi, ProxyRecord};
pub use rule_api::RuleApi;
pub use subscription_api::SubscriptionApi;

use kitty_domain::backend::{decode, encode};
use kitty_domain::mapping::FieldSchema;
use kitty_domain::DomainError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Backend reply -> typed UI record
pub(crate) fn from_backend<T: DeserializeOwned>(schema: &FieldSchema, reply: Value) -> Result<T, DomainError> {
    Ok(decode(schema.to_ui(&reply))?)
}

/// Like [`from_backend`], with `null` meaning "no such record"
pub(crate) fn from_backend_optional<T: DeserializeOwned>(
    schema: &FieldSchema,
    reply: Value,
) -> Result<Option<T>, DomainError> {
    if reply.is_null() {
        return Ok(None);
    }
    from_backend(schema, reply).map(Some)
}

/// Typed UI record -> backend record
pub(crate) fn to_backend<T: Serialize>(schema: &FieldSchema, record: &T) -> Result<Value, DomainError> {
    Ok(schema.to_backend(&encode(record)?))
}
