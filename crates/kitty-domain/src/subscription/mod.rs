use serde::{Deserialize, Serialize};

/// Subscription with node statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub is_active: bool,
    pub node_count: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub last_sync_at: Option<String>,
}

/// Minimal subscription reference returned by the batch query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Subscription {
    pub id: i32,
    pub url: String,
}
