//! Mapping tables for the records exchanged with the backend.
//!
//! The latest backend record shapes are authoritative.

use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::schema::FieldSchema;

static BASE_CONFIG: OnceLock<FieldSchema> = OnceLock::new();
static HYSTERIA: OnceLock<FieldSchema> = OnceLock::new();
static XRAY: OnceLock<FieldSchema> = OnceLock::new();
static RULE: OnceLock<FieldSchema> = OnceLock::new();
static PROXY_SUMMARY: OnceLock<FieldSchema> = OnceLock::new();
static SUBSCRIPTION: OnceLock<FieldSchema> = OnceLock::new();

/// Plain case conversion for every field
pub fn base_config() -> &'static FieldSchema {
    BASE_CONFIG.get_or_init(|| FieldSchema::builder("base_config").build())
}

/// Hysteria records: the TLS pin field keeps its upper-case backend spelling
pub fn hysteria() -> &'static FieldSchema {
    HYSTERIA.get_or_init(|| {
        let tls = FieldSchema::builder("hysteria.tls")
            .preserve("pinSha256", "pinSHA256")
            .build();
        FieldSchema::builder("hysteria").nested("tls", "tls", tls).build()
    })
}

/// Xray records.
///
/// `id` is never written back. Stream settings travel verbatim because the
/// backend stores them in xray's own camelCase layout; on the way in the
/// websocket `Host` header is normalised to `host`.
pub fn xray() -> &'static FieldSchema {
    XRAY.get_or_init(|| {
        FieldSchema::builder("xray")
            .read_only("id", "id")
            .custom(
                "streamSettings",
                "stream_settings",
                Value::clone,
                lower_host_header,
            )
            .build()
    })
}

/// Rule records: the UI calls the matched text `pattern`, the backend `rule`
pub fn rule() -> &'static FieldSchema {
    RULE.get_or_init(|| {
        FieldSchema::builder("rule")
            .rename("action", "rule_action")
            .rename("ruleType", "rule_type")
            .rename("pattern", "rule")
            .build()
    })
}

/// Unified proxy list entries
pub fn proxy_summary() -> &'static FieldSchema {
    PROXY_SUMMARY.get_or_init(|| FieldSchema::builder("proxy_summary").build())
}

/// Subscription records
pub fn subscription() -> &'static FieldSchema {
    SUBSCRIPTION.get_or_init(|| FieldSchema::builder("subscription").build())
}

fn lower_host_header(value: &Value) -> Value {
    match value {
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(k, v)| {
                    let key = if k == "Host" { "host".to_string() } else { k.clone() };
                    (key, lower_host_header(v))
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(lower_host_header).collect()),
        other => other.clone(),
    }
}
