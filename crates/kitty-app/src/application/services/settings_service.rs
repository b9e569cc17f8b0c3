use kitty_domain::backend::{args, decode};
use kitty_domain::mapping::schemas;
use kitty_domain::setting::{BaseConfig, LogLevel};
use kitty_domain::{BackendCaller, CallArgs, DomainError};
use serde_json::json;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{info, instrument, warn};

use super::api::{from_backend, to_backend, ProxyApi};

/// Logic behind the settings page: the backend base config, the system
/// proxy switch and the backend log level
pub struct SettingsService {
    backend: Arc<dyn BackendCaller>,
    proxy_api: Arc<ProxyApi>,
    config: RwLock<BaseConfig>,
    loading: AtomicBool,
    proxy_loading: AtomicBool,
}

impl SettingsService {
    pub fn new(backend: Arc<dyn BackendCaller>, proxy_api: Arc<ProxyApi>) -> Self {
        Self {
            backend,
            proxy_api,
            config: RwLock::new(BaseConfig::default()),
            loading: AtomicBool::new(true),
            proxy_loading: AtomicBool::new(false),
        }
    }

    /// Load the base config from the backend
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<BaseConfig, DomainError> {
        let reply = self.backend.call("query_base_config", CallArgs::new()).await?;
        let config: BaseConfig = from_backend(schemas::base_config(), reply)?;
        self.replace(config.clone());
        self.loading.store(false, Ordering::SeqCst);
        info!(
            http_port = config.http_port,
            socks_port = config.socks_port,
            "⚙️ Base config loaded"
        );
        Ok(config)
    }

    pub fn base_config(&self) -> BaseConfig {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// True until the first successful [`init`](Self::init)
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_proxy_loading(&self) -> bool {
        self.proxy_loading.load(Ordering::SeqCst)
    }

    /// Send `config` to the backend and keep it as the current config
    #[instrument(skip(self, config))]
    pub async fn update_base_config(&self, config: BaseConfig) -> Result<(), DomainError> {
        let record = to_backend(schemas::base_config(), &config)?;
        self.backend
            .call("update_base_config", args([("record", record)]))
            .await?;
        self.replace(config);
        Ok(())
    }

    /// Persist the current config
    pub async fn save_base_config(&self) -> Result<(), DomainError> {
        self.update_base_config(self.base_config()).await
    }

    /// Turn the OS proxy on or off.
    ///
    /// A failed switch is logged, not returned, and leaves the flag off.
    /// Returns the resulting flag.
    #[instrument(skip(self))]
    pub async fn switch_system_proxy(&self, enable: bool) -> bool {
        self.proxy_loading.store(true, Ordering::SeqCst);
        self.modify(|c| c.sysproxy_flag = enable);

        let flag = match self.proxy_api.set_system_proxy(enable).await {
            Ok(()) => enable,
            Err(e) => {
                warn!(enable, error = %e, "System proxy switch failed");
                self.modify(|c| c.sysproxy_flag = false);
                false
            }
        };

        self.proxy_loading.store(false, Ordering::SeqCst);
        flag
    }

    pub async fn get_log_level(&self) -> Result<LogLevel, DomainError> {
        let reply = self.backend.call("get_log_level", CallArgs::new()).await?;
        let level: String = decode(reply)?;
        LogLevel::from_str(&level)
    }

    pub async fn set_log_level(&self, level: LogLevel) -> Result<(), DomainError> {
        self.backend
            .call("set_log_level", args([("log_level", json!(level.as_str()))]))
            .await?;
        Ok(())
    }

    /// Apply a new backend log level and persist it in the base config
    #[instrument(skip(self))]
    pub async fn change_log_level(&self, level: LogLevel) -> Result<(), DomainError> {
        self.set_log_level(level).await?;
        self.modify(|c| c.log_level = level);
        self.save_base_config().await?;
        info!(level = level.as_str(), "🔧 Backend log level changed");
        Ok(())
    }

    fn replace(&self, config: BaseConfig) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    fn modify(&self, change: impl FnOnce(&mut BaseConfig)) {
        change(&mut self.config.write().unwrap_or_else(|e| e.into_inner()));
    }
}
