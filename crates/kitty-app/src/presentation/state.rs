use kitty_domain::proxy::Proxy;
use kitty_domain::setting::KeyValueStorage;
use kitty_domain::subscription::SubscriptionInfo;
use kitty_domain::{BackendCaller, DomainError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::{
    ProxyApi, RuleApi, SettingsService, SubscriptionApi, SubscriptionAutoUpdate,
};
use crate::application::stores::{LogQueue, ProxyStore, SettingStore, SubscriptionStore};

pub struct Stores {
    pub settings: Arc<SettingStore>,
    pub proxy: Arc<ProxyStore>,
    pub subscriptions: Arc<SubscriptionStore>,
    pub logs: Arc<LogQueue>,
}

pub struct Services {
    pub proxy_api: Arc<ProxyApi>,
    pub rule_api: Arc<RuleApi>,
    pub subscription_api: Arc<SubscriptionApi>,
    pub settings: Arc<SettingsService>,
    pub auto_update: Arc<SubscriptionAutoUpdate>,
}

/// Everything the UI side owns, built once at startup and passed by reference
pub struct AppContext {
    pub backend: Arc<dyn BackendCaller>,
    pub stores: Stores,
    pub services: Services,
}

impl AppContext {
    pub fn new(
        backend: Arc<dyn BackendCaller>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self, DomainError> {
        crate::presentation::bootstrap::build_app_context(backend, storage)
    }

    /// Reload the proxy list cache
    pub async fn refresh_proxies(&self) -> Result<Vec<Proxy>, DomainError> {
        let proxies = self.services.proxy_api.get_all_proxies().await?;
        self.stores.proxy.replace_proxies(proxies.clone());
        info!(count = proxies.len(), "Proxy list refreshed");
        Ok(proxies)
    }

    /// Reload the subscription list; the loading flag is raised for the
    /// duration of the call
    pub async fn refresh_subscriptions(&self) -> Result<Vec<SubscriptionInfo>, DomainError> {
        let _loading = self.stores.subscriptions.begin_loading();
        match self.services.subscription_api.get_all_subscriptions().await {
            Ok(subscriptions) => {
                self.stores.subscriptions.replace(subscriptions.clone());
                Ok(subscriptions)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load subscriptions");
                Err(e)
            }
        }
    }

    /// Record a line from the backend's log stream
    pub fn ingest_backend_log(&self, line: &str) {
        kitty_infrastructure::logging::ingest_backend_log(line);
        self.stores.logs.push(line.trim_end());
    }

    /// Stop background work
    pub async fn shutdown(&self) {
        self.services.auto_update.stop().await;
        info!("👋 Application context shut down");
    }
}
