pub mod api;
mod auto_update;
pub mod scheduler;
mod settings_service;

pub use api::{ProxyApi, ProxyRecord, RuleApi, SubscriptionApi};
pub use auto_update::SubscriptionAutoUpdate;
pub use scheduler::{ScheduledTask, TaskAction};
pub use settings_service::SettingsService;
