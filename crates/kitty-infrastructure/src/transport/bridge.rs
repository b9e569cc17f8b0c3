use async_trait::async_trait;
use kitty_domain::backend::KittyResponse;
use kitty_domain::{BackendCaller, CallArgs, CallError};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, warn};

/// Handler for one named command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, args: CallArgs) -> Result<Value, CallError>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
{
    async fn handle(&self, args: CallArgs) -> Result<Value, CallError> {
        (self)(args).await
    }
}

/// Dispatches commands to handlers living in the same process.
///
/// Handler replies may be wrapped in the `{code, msg, data}` envelope or be
/// bare data.
#[derive(Default)]
pub struct InProcessBridge {
    handlers: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
}

impl InProcessBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(self, command: &str, handler: impl CommandHandler + 'static) -> Self {
        self.register(command, handler);
        self
    }

    /// Register `handler` for `command`, replacing any previous one
    pub fn register(&self, command: &str, handler: impl CommandHandler + 'static) -> bool {
        match self.handlers.write() {
            Ok(mut handlers) => {
                let replaced = handlers
                    .insert(command.to_string(), Arc::new(handler))
                    .is_some();
                if replaced {
                    debug!(command, "Command handler replaced");
                }
                replaced
            }
            Err(e) => {
                warn!(command, error = %e, "Handler registry poisoned, registration dropped");
                false
            }
        }
    }

    pub fn unregister(&self, command: &str) -> bool {
        self.handlers
            .write()
            .map(|mut handlers| handlers.remove(command).is_some())
            .unwrap_or(false)
    }

    pub fn commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = self
            .handlers
            .read()
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default();
        commands.sort();
        commands
    }

    fn handler(&self, command: &str) -> Result<Arc<dyn CommandHandler>, CallError> {
        let handlers = self
            .handlers
            .read()
            .map_err(|e| CallError::Transport(e.to_string()))?;
        handlers
            .get(command)
            .cloned()
            .ok_or_else(|| CallError::UnknownCommand(command.to_string()))
    }
}

#[async_trait]
impl BackendCaller for InProcessBridge {
    async fn call(&self, command: &str, args: CallArgs) -> Result<Value, CallError> {
        let started = Instant::now();
        let handler = match self.handler(command) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(command, error = %e, "Backend call failed");
                return Err(e);
            }
        };

        let result = handler
            .handle(args)
            .await
            .and_then(KittyResponse::unwrap_payload);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(command, elapsed_ms, "Backend call completed"),
            Err(e) => warn!(command, elapsed_ms, error = %e, "Backend call failed"),
        }

        result
    }
}
