use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::proxy::ProxyKind;
use crate::shared::DomainError;

/// Routing mode of the local proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProxyMode {
    Global,
    #[default]
    Rules,
    Direct,
}

/// Backend log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(DomainError::Validation(
                "Invalid log level. Must be one of: error, warn, info, debug, trace".to_string(),
            )),
        }
    }
}

/// Backend-persisted configuration, UI shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseConfig {
    pub id: i32,
    pub local_ip: String,
    pub http_port: u16,
    pub socks_port: u16,
    pub delay_test_url: String,
    pub sysproxy_flag: bool,
    pub auto_start: bool,
    pub language: String,
    pub allow_lan: bool,
    pub mode: ProxyMode,
    pub update_interval: u32,
    pub log_level: LogLevel,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            id: 0,
            local_ip: "127.0.0.1".to_string(),
            http_port: 10086,
            socks_port: 10087,
            delay_test_url: "https://gstatic.com/generate_204".to_string(),
            sysproxy_flag: false,
            auto_start: false,
            language: "zh-CN".to_string(),
            allow_lan: false,
            mode: ProxyMode::Rules,
            update_interval: 3,
            log_level: LogLevel::Debug,
        }
    }
}

/// Settings kept only on this machine (key `setting`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalSettings {
    /// Local hour (0-23) at which subscriptions refresh
    pub auto_update: u32,
    pub sysproxy_flag: bool,
    pub port: u16,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            auto_update: 3,
            sysproxy_flag: false,
            port: 11080,
        }
    }
}

/// Proxy page preferences (key `proxy`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyPreference {
    pub current_proxy: ProxyKind,
}

/// Local key/value persistence for UI-side settings.
///
/// Values are whole JSON documents keyed by store name (`setting`, `proxy`).
pub trait KeyValueStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, DomainError>;

    fn save(&self, key: &str, value: Value) -> Result<(), DomainError>;

    fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Accept only a wall-clock hour
pub fn validate_hour(hour: u32) -> Result<u32, DomainError> {
    if hour > 23 {
        return Err(DomainError::Validation(format!(
            "Hour must be between 0 and 23, got {hour}"
        )));
    }
    Ok(hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_config_defaults_fill_missing_fields() {
        let config: BaseConfig = serde_json::from_value(json!({
            "id": 1,
            "httpPort": 7890,
            "socksPort": 7891
        }))
        .unwrap();
        assert_eq!(config.http_port, 7890);
        assert_eq!(config.local_ip, "127.0.0.1");
        assert_eq!(config.mode, ProxyMode::Rules);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_local_settings_defaults() {
        let settings = LocalSettings::default();
        assert_eq!(settings.auto_update, 3);
        assert!(!settings.sysproxy_flag);
        assert_eq!(settings.port, 11080);

        let partial: LocalSettings = serde_json::from_value(json!({"autoUpdate": 6})).unwrap();
        assert_eq!(partial.auto_update, 6);
        assert_eq!(partial.port, 11080);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_validate_hour() {
        assert_eq!(validate_hour(0).unwrap(), 0);
        assert_eq!(validate_hour(23).unwrap(), 23);
        assert!(validate_hour(24).is_err());
    }
}
