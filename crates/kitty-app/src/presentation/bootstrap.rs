use anyhow::Context;
use kitty_domain::setting::KeyValueStorage;
use kitty_domain::{BackendCaller, DomainError};
use kitty_infrastructure::{HttpBackendClient, JsonFileStorage};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::config::AppConfig;
use crate::application::services::{
    ProxyApi, RuleApi, SettingsService, SubscriptionApi, SubscriptionAutoUpdate,
};
use crate::application::stores::{LogQueue, ProxyStore, SettingStore, SubscriptionStore};
use crate::presentation::state::{AppContext, Services, Stores};

/// Wire the context on top of an HTTP backend and the settings file in the
/// data dir
pub fn build_from_config(config: &AppConfig) -> anyhow::Result<AppContext> {
    let started_at = Instant::now();
    let backend = HttpBackendClient::with_timeouts(config.backend_url.as_str(), &config.timeouts)?;
    info!(
        "✓ Backend client ready at {} ({}ms)",
        backend.base_url(),
        started_at.elapsed().as_millis()
    );

    let started_at = Instant::now();
    let storage = JsonFileStorage::in_dir(&config.data_dir)
        .with_context(|| format!("Failed to open settings in {:?}", config.data_dir))?;
    info!(
        "✓ Settings file {:?} opened ({}ms)",
        storage.path(),
        started_at.elapsed().as_millis()
    );

    Ok(build_app_context(Arc::new(backend), Arc::new(storage))?)
}

pub fn build_app_context(
    backend: Arc<dyn BackendCaller>,
    storage: Arc<dyn KeyValueStorage>,
) -> Result<AppContext, DomainError> {
    let startup_started_at = Instant::now();

    let started_at = Instant::now();
    let stores = Stores {
        settings: Arc::new(SettingStore::load(storage.clone())?),
        proxy: Arc::new(ProxyStore::load(storage)?),
        subscriptions: Arc::new(SubscriptionStore::new()),
        logs: Arc::new(LogQueue::new()),
    };
    info!(
        "✓ Stores loaded ({}ms)",
        started_at.elapsed().as_millis()
    );

    let proxy_api = Arc::new(ProxyApi::new(backend.clone()));
    let services = Services {
        rule_api: Arc::new(RuleApi::new(backend.clone())),
        subscription_api: Arc::new(SubscriptionApi::new(backend.clone())),
        settings: Arc::new(SettingsService::new(backend.clone(), proxy_api.clone())),
        auto_update: Arc::new(SubscriptionAutoUpdate::new(
            proxy_api.clone(),
            stores.settings.clone(),
        )),
        proxy_api,
    };

    info!(
        "🚀 Application context ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );

    Ok(AppContext {
        backend,
        stores,
        services,
    })
}
