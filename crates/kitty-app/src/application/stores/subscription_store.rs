use kitty_domain::subscription::SubscriptionInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Subscription list shown by the UI, kept in memory only
#[derive(Default)]
pub struct SubscriptionStore {
    subscriptions: RwLock<Vec<SubscriptionInfo>>,
    loading: AtomicBool,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn replace(&self, subscriptions: Vec<SubscriptionInfo>) {
        *self.subscriptions.write().unwrap_or_else(|e| e.into_inner()) = subscriptions;
    }

    pub fn active(&self) -> Option<SubscriptionInfo> {
        self.subscriptions().into_iter().find(|s| s.is_active)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Raise the loading flag until the guard is dropped
    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        self.loading.store(true, Ordering::SeqCst);
        LoadingGuard { store: self }
    }
}

/// Clears the loading flag on drop, whatever path the load took
pub struct LoadingGuard<'a> {
    store: &'a SubscriptionStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.loading.store(false, Ordering::SeqCst);
    }
}
