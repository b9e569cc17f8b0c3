use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::shared::DomainError;

/// Which backend engine serves a proxy record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    #[default]
    Hysteria,
    Xray,
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Hysteria => "hysteria",
            ProxyKind::Xray => "xray",
        }
    }
}

impl FromStr for ProxyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hysteria" => Ok(ProxyKind::Hysteria),
            "xray" => Ok(ProxyKind::Xray),
            _ => Err(DomainError::Validation(format!(
                "Invalid proxy type: {s}. Must be 'hysteria' or 'xray'"
            ))),
        }
    }
}

/// Unified proxy list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    pub id: i32,
    pub name: String,
    pub proxy_type: ProxyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Proxy {
    /// Two-letter badge shown next to the proxy name
    pub fn short_name(&self) -> String {
        protocol_short_name(self.protocol.as_deref().unwrap_or_default(), self.proxy_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HysteriaTls {
    pub sni: String,
    pub insecure: bool,
    #[serde(default)]
    pub pin_sha256: Option<String>,
    #[serde(default)]
    pub ca: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Bandwidth {
    pub up: String,
    pub down: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HysteriaProxy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
    pub server: String,
    pub auth: String,
    pub tls: HysteriaTls,
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XrayProtocol {
    Vless,
    Vmess,
    Trojan,
}

/// Xray record as edited by the UI.
///
/// `stream_settings` is kept as raw JSON: its layout belongs to xray and
/// depends on `network`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayProxy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
    pub protocol: XrayProtocol,
    pub uuid: String,
    pub address: String,
    pub port: u16,
    pub stream_settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe_id: Option<i32>,
}

impl XrayProxy {
    /// Transport network of the stream settings (`ws`, `tcp`, `grpc`, ...)
    pub fn network(&self) -> Option<&str> {
        self.stream_settings.get("network").and_then(Value::as_str)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Proxy name cannot be empty".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::Validation(
                "Proxy address cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(DomainError::Validation(
                "Proxy port must be greater than 0".to_string(),
            ));
        }
        if self.network().is_none() {
            return Err(DomainError::Validation(
                "Stream settings must declare a network".to_string(),
            ));
        }
        Ok(())
    }
}

/// Endpoint submitted for a latency test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDelayInfo {
    pub id: u32,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDelay {
    pub id: u32,
    pub delay: u64,
}

/// `HY` for hysteria, `VL`/`VM`/`TR` for the xray protocols, otherwise the
/// first two characters of the tag upper-cased.
pub fn protocol_short_name(tag: &str, kind: ProxyKind) -> String {
    if kind == ProxyKind::Hysteria {
        return "HY".to_string();
    }

    match tag.to_lowercase().as_str() {
        "vless" => "VL".to_string(),
        "vmess" => "VM".to_string(),
        "trojan" => "TR".to_string(),
        _ => tag.chars().take(2).collect::<String>().to_uppercase(),
    }
}
