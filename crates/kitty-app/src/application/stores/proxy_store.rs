use kitty_domain::proxy::{Proxy, ProxyKind};
use kitty_domain::setting::{KeyValueStorage, ProxyPreference};
use kitty_domain::DomainError;
use std::sync::{Arc, RwLock};
use tracing::info;

use super::{load_or_default, persist};

pub const PROXY_KEY: &str = "proxy";

/// Active proxy engine (persisted) and the last fetched proxy list
pub struct ProxyStore {
    storage: Arc<dyn KeyValueStorage>,
    preference: RwLock<ProxyPreference>,
    proxies: RwLock<Vec<Proxy>>,
}

impl ProxyStore {
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Result<Self, DomainError> {
        let preference = load_or_default(storage.as_ref(), PROXY_KEY)?;
        Ok(Self {
            storage,
            preference: RwLock::new(preference),
            proxies: RwLock::new(Vec::new()),
        })
    }

    pub fn current_proxy(&self) -> ProxyKind {
        self.preference
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .current_proxy
    }

    pub fn set_current_proxy(&self, kind: ProxyKind) -> Result<(), DomainError> {
        let mut preference = self
            .preference
            .write()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let next = ProxyPreference {
            current_proxy: kind,
        };
        persist(self.storage.as_ref(), PROXY_KEY, &next)?;
        *preference = next;
        info!(kind = kind.as_str(), "Current proxy engine changed");
        Ok(())
    }

    pub fn proxies(&self) -> Vec<Proxy> {
        self.proxies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Cached entries of the active engine
    pub fn proxies_of_current_kind(&self) -> Vec<Proxy> {
        let kind = self.current_proxy();
        self.proxies()
            .into_iter()
            .filter(|p| p.proxy_type == kind)
            .collect()
    }

    pub fn replace_proxies(&self, proxies: Vec<Proxy>) {
        *self.proxies.write().unwrap_or_else(|e| e.into_inner()) = proxies;
    }
}
