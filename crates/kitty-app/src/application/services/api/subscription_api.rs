use kitty_domain::backend::args;
use kitty_domain::mapping::schemas;
use kitty_domain::subscription::SubscriptionInfo;
use kitty_domain::{BackendCaller, CallArgs, DomainError};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

use super::from_backend;

/// Subscription management commands
pub struct SubscriptionApi {
    backend: Arc<dyn BackendCaller>,
}

impl SubscriptionApi {
    pub fn new(backend: Arc<dyn BackendCaller>) -> Self {
        Self { backend }
    }

    pub async fn get_all_subscriptions(&self) -> Result<Vec<SubscriptionInfo>, DomainError> {
        let reply = self
            .backend
            .call("get_all_subscriptions", CallArgs::new())
            .await?;
        from_backend(schemas::subscription(), reply)
    }

    #[instrument(skip(self))]
    pub async fn create_subscription(
        &self,
        name: &str,
        url: &str,
    ) -> Result<SubscriptionInfo, DomainError> {
        let reply = self
            .backend
            .call(
                "create_subscription",
                args([("name", json!(name)), ("url", json!(url))]),
            )
            .await?;
        let created: SubscriptionInfo = from_backend(schemas::subscription(), reply)?;
        info!(id = created.id, "✅ Subscription created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_subscription(
        &self,
        id: i32,
        name: &str,
        url: &str,
    ) -> Result<SubscriptionInfo, DomainError> {
        let reply = self
            .backend
            .call(
                "update_subscription",
                args([("id", json!(id)), ("name", json!(name)), ("url", json!(url))]),
            )
            .await?;
        from_backend(schemas::subscription(), reply)
    }

    #[instrument(skip(self))]
    pub async fn delete_subscription(&self, id: i32) -> Result<(), DomainError> {
        self.by_id("delete_subscription", id).await
    }

    /// Make `id` the active subscription
    #[instrument(skip(self))]
    pub async fn switch_subscription(&self, id: i32) -> Result<(), DomainError> {
        self.by_id("switch_subscription", id).await
    }

    #[instrument(skip(self))]
    pub async fn refresh_subscription(&self, id: i32) -> Result<(), DomainError> {
        self.by_id("refresh_subscription", id).await
    }

    async fn by_id(&self, command: &str, id: i32) -> Result<(), DomainError> {
        self.backend.call(command, args([("id", json!(id))])).await?;
        Ok(())
    }
}
