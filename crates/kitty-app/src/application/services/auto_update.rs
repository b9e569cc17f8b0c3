use kitty_domain::schedule::TaskStatus;
use kitty_domain::setting::validate_hour;
use kitty_domain::DomainError;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::api::ProxyApi;
use super::scheduler::{Clock, LocalClock, ScheduledTask};
use crate::application::stores::SettingStore;

const TASK_NAME: &str = "subscription-auto-update";

struct Runner<C: Clock> {
    task: ScheduledTask<C>,
    forwarder: JoinHandle<()>,
}

struct State<C: Clock> {
    runner: Option<Runner<C>>,
    active: bool,
}

/// Refreshes every subscription once a day at the hour kept in the
/// settings store
pub struct SubscriptionAutoUpdate<C: Clock + Clone = LocalClock> {
    proxy_api: Arc<ProxyApi>,
    settings: Arc<SettingStore>,
    clock: C,
    state: Mutex<State<C>>,
    status: Arc<watch::Sender<TaskStatus>>,
}

impl SubscriptionAutoUpdate<LocalClock> {
    pub fn new(proxy_api: Arc<ProxyApi>, settings: Arc<SettingStore>) -> Self {
        Self::with_clock(proxy_api, settings, LocalClock)
    }
}

impl<C: Clock + Clone> SubscriptionAutoUpdate<C> {
    pub fn with_clock(proxy_api: Arc<ProxyApi>, settings: Arc<SettingStore>, clock: C) -> Self {
        let (status, _) = watch::channel(TaskStatus::Stopped);
        Self {
            proxy_api,
            settings,
            clock,
            state: Mutex::new(State {
                runner: None,
                active: false,
            }),
            status: Arc::new(status),
        }
    }

    /// Refresh now, then daily
    pub async fn start(&self) -> Result<(), DomainError> {
        let task = {
            let mut state = self.state.lock().await;
            state.active = true;
            match &state.runner {
                Some(runner) => runner.task.clone(),
                None => {
                    let runner = self.build(self.settings.auto_update())?;
                    let task = runner.task.clone();
                    state.runner = Some(runner);
                    task
                }
            }
        };
        info!(hour = task.hour(), "Subscription auto-update started");
        task.start().await;
        Ok(())
    }

    pub async fn stop(&self) {
        let task = {
            let mut state = self.state.lock().await;
            state.active = false;
            state.runner.as_ref().map(|r| r.task.clone())
        };
        if let Some(task) = task {
            task.stop().await;
        }
    }

    /// Move the daily refresh to `hour`.
    ///
    /// Persists the hour, replaces the runner and restarts it if the feature
    /// was active. Returns false when the hour is unchanged.
    pub async fn reconfigure(&self, hour: u32) -> Result<bool, DomainError> {
        let hour = validate_hour(hour)?;
        let (task, restart) = {
            let mut state = self.state.lock().await;
            let current = state
                .runner
                .as_ref()
                .map(|r| r.task.hour())
                .unwrap_or_else(|| self.settings.auto_update());
            if current == hour {
                debug!(hour, "Auto-update hour unchanged");
                return Ok(false);
            }

            self.settings.set_auto_update(hour)?;
            if let Some(old) = state.runner.take() {
                old.task.stop().await;
                old.forwarder.abort();
            }
            let runner = self.build(hour)?;
            let task = runner.task.clone();
            state.runner = Some(runner);
            (task, state.active)
        };

        info!(hour, "Subscription auto-update rescheduled");
        if restart {
            task.start().await;
        }
        Ok(true)
    }

    /// Status of the current runner, following runner replacements
    pub fn status(&self) -> watch::Receiver<TaskStatus> {
        self.status.subscribe()
    }

    pub fn current_status(&self) -> TaskStatus {
        *self.status.borrow()
    }

    /// Hour of the current runner, or the stored hour before the first start
    pub async fn hour(&self) -> u32 {
        let state = self.state.lock().await;
        state
            .runner
            .as_ref()
            .map(|r| r.task.hour())
            .unwrap_or_else(|| self.settings.auto_update())
    }

    pub async fn next_run_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let task = self.state.lock().await.runner.as_ref().map(|r| r.task.clone())?;
        task.next_run_at().await
    }

    fn build(&self, hour: u32) -> Result<Runner<C>, DomainError> {
        let api = Arc::clone(&self.proxy_api);
        let task = ScheduledTask::with_clock(TASK_NAME, hour, self.clock.clone(), move || {
            let api = Arc::clone(&api);
            async move { refresh_all(&api).await }
        })?;
        let forwarder = forward_status(task.status(), Arc::clone(&self.status));
        Ok(Runner { task, forwarder })
    }
}

impl<C: Clock + Clone> Drop for SubscriptionAutoUpdate<C> {
    fn drop(&mut self) {
        if let Some(runner) = self.state.get_mut().runner.take() {
            runner.forwarder.abort();
        }
    }
}

/// Fetch every subscription and refresh them in one call
async fn refresh_all(api: &ProxyApi) -> anyhow::Result<()> {
    let subscriptions = api.batch_get_subscriptions().await?;
    if subscriptions.is_empty() {
        debug!("No subscriptions to refresh");
        return Ok(());
    }
    let ids: Vec<i32> = subscriptions.iter().map(|s| s.id).collect();
    api.auto_update_subscription(&ids).await?;
    Ok(())
}

fn forward_status(
    mut source: watch::Receiver<TaskStatus>,
    sink: Arc<watch::Sender<TaskStatus>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let status = *source.borrow_and_update();
            sink.send_replace(status);
            if source.changed().await.is_err() {
                break;
            }
        }
    })
}
