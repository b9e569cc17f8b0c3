use kitty_domain::backend::{args, decode, encode};
use kitty_domain::mapping::schemas;
use kitty_domain::proxy::{
    HysteriaProxy, Proxy, ProxyDelay, ProxyDelayInfo, ProxyKind, XrayProxy,
};
use kitty_domain::subscription::Subscription;
use kitty_domain::{BackendCaller, CallArgs, DomainError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use url::Url;

use super::{from_backend, from_backend_optional, to_backend};

/// A full proxy record of either engine
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyRecord {
    Hysteria(HysteriaProxy),
    Xray(XrayProxy),
}

impl ProxyRecord {
    pub fn kind(&self) -> ProxyKind {
        match self {
            ProxyRecord::Hysteria(_) => ProxyKind::Hysteria,
            ProxyRecord::Xray(_) => ProxyKind::Xray,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProxyRecord::Hysteria(proxy) => &proxy.name,
            ProxyRecord::Xray(proxy) => &proxy.name,
        }
    }
}

/// Proxy, xray subscription and system proxy commands
pub struct ProxyApi {
    backend: Arc<dyn BackendCaller>,
}

impl ProxyApi {
    pub fn new(backend: Arc<dyn BackendCaller>) -> Self {
        Self { backend }
    }

    async fn call(&self, command: &str, args: CallArgs) -> Result<Value, DomainError> {
        Ok(self.backend.call(command, args).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_all_proxies(&self) -> Result<Vec<Proxy>, DomainError> {
        let reply = self.call("get_all_proxies", CallArgs::new()).await?;
        from_backend(schemas::proxy_summary(), reply)
    }

    pub async fn get_all_hysterias(&self) -> Result<Vec<HysteriaProxy>, DomainError> {
        let reply = self.call("get_all_hysterias", CallArgs::new()).await?;
        from_backend(schemas::hysteria(), reply)
    }

    pub async fn get_hysteria_by_id(&self, id: i32) -> Result<Option<HysteriaProxy>, DomainError> {
        let reply = self.call("get_hysteria_by_id", args([("id", json!(id))])).await?;
        from_backend_optional(schemas::hysteria(), reply)
    }

    pub async fn get_all_xrays(&self) -> Result<Vec<XrayProxy>, DomainError> {
        let reply = self.call("get_all_xrays", CallArgs::new()).await?;
        from_backend(schemas::xray(), reply)
    }

    pub async fn get_xray_by_id(&self, id: i32) -> Result<Option<XrayProxy>, DomainError> {
        let reply = self.call("get_xray_by_id", args([("id", json!(id))])).await?;
        from_backend_optional(schemas::xray(), reply)
    }

    pub async fn get_proxy_by_id_and_kind(
        &self,
        id: i32,
        kind: ProxyKind,
    ) -> Result<Option<ProxyRecord>, DomainError> {
        Ok(match kind {
            ProxyKind::Hysteria => self.get_hysteria_by_id(id).await?.map(ProxyRecord::Hysteria),
            ProxyKind::Xray => self.get_xray_by_id(id).await?.map(ProxyRecord::Xray),
        })
    }

    #[instrument(skip(self, proxy), fields(name = %proxy.name))]
    pub async fn create_hysteria_proxy(&self, proxy: &HysteriaProxy) -> Result<(), DomainError> {
        let record = to_backend(schemas::hysteria(), proxy)?;
        self.call("add_hysteria_item", args([("record", record)])).await?;
        Ok(())
    }

    #[instrument(skip(self, proxy), fields(name = %proxy.name))]
    pub async fn update_hysteria_proxy(&self, proxy: &HysteriaProxy) -> Result<(), DomainError> {
        let record = to_backend(schemas::hysteria(), proxy)?;
        self.call("update_hysteria_item", args([("record", record)])).await?;
        Ok(())
    }

    pub async fn delete_hysteria_proxy(&self, id: i32) -> Result<(), DomainError> {
        self.call("delete_hysteria_item", args([("id", json!(id))])).await?;
        Ok(())
    }

    #[instrument(skip(self, proxy), fields(name = %proxy.name))]
    pub async fn create_xray_proxy(&self, proxy: &XrayProxy) -> Result<(), DomainError> {
        proxy.validate()?;
        let record = to_backend(schemas::xray(), proxy)?;
        self.call("add_xray_item", args([("record", record)])).await?;
        Ok(())
    }

    #[instrument(skip(self, proxy), fields(name = %proxy.name))]
    pub async fn update_xray_proxy(&self, proxy: &XrayProxy) -> Result<(), DomainError> {
        proxy.validate()?;
        let record = to_backend(schemas::xray(), proxy)?;
        self.call("update_xray_item", args([("record", record)])).await?;
        Ok(())
    }

    pub async fn delete_xray_proxy(&self, id: i32) -> Result<(), DomainError> {
        self.call("delete_xray_item", args([("id", json!(id))])).await?;
        Ok(())
    }

    /// Import the nodes of a subscription URL as xray records
    #[instrument(skip(self))]
    pub async fn import_subscription(&self, url: &str) -> Result<(), DomainError> {
        let url = Url::parse(url.trim())
            .map_err(|e| DomainError::InvalidInput(format!("Invalid subscription URL: {}", e)))?;
        self.call("import_xray_subscribe", args([("url", json!(url.as_str()))]))
            .await?;
        Ok(())
    }

    /// Re-fetch the given subscriptions
    #[instrument(skip(self), fields(count = subscription_ids.len()))]
    pub async fn auto_update_subscription(&self, subscription_ids: &[i32]) -> Result<(), DomainError> {
        self.call(
            "refresh_xray_subscription",
            args([("record_ids", json!(subscription_ids))]),
        )
        .await?;
        info!(count = subscription_ids.len(), "🔄 Subscriptions refreshed");
        Ok(())
    }

    pub async fn batch_get_subscriptions(&self) -> Result<Vec<Subscription>, DomainError> {
        let reply = self.call("batch_get_subscriptions", CallArgs::new()).await?;
        Ok(decode(reply)?)
    }

    /// Latency per proxy id, in milliseconds
    #[instrument(skip(self, proxies), fields(count = proxies.len()))]
    pub async fn proxies_delay_test(
        &self,
        proxies: &[ProxyDelayInfo],
    ) -> Result<HashMap<u32, u64>, DomainError> {
        let reply = self
            .call("proxies_delay_test", args([("proxies", encode(&proxies)?)]))
            .await?;
        let delays: Vec<ProxyDelay> = decode(reply)?;
        Ok(delays.into_iter().map(|d| (d.id, d.delay)).collect())
    }

    /// Latency of the active proxy towards `target_url`, in milliseconds
    pub async fn current_proxy_delay(&self, proxy: &str, target_url: &str) -> Result<u64, DomainError> {
        let reply = self
            .call(
                "test_current_proxy",
                args([("proxy", json!(proxy)), ("target_url", json!(target_url))]),
            )
            .await?;
        Ok(decode(reply)?)
    }

    /// Point the OS proxy settings at the local server, or clear them
    #[instrument(skip(self))]
    pub async fn set_system_proxy(&self, enable: bool) -> Result<(), DomainError> {
        let command = if enable {
            "set_system_proxy_only"
        } else {
            "stop_system_proxy"
        };
        self.call(command, CallArgs::new()).await?;
        info!(enable, "System proxy switched");
        Ok(())
    }
}
