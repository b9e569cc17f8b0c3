use anyhow::{Context, Result};
use async_trait::async_trait;
use kitty_domain::backend::KittyResponse;
use kitty_domain::{BackendCaller, CallArgs, CallError};
use reqwest::Client;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::excerpt;
use crate::config::TimeoutConfig;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const USER_AGENT: &str = concat!("kitty-ui/", env!("CARGO_PKG_VERSION"));
const ERROR_BODY_EXCERPT: usize = 200;

/// Calls the backend over HTTP: `POST {base_url}/api/{command}` with the
/// arguments as the JSON body.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    base_url: Url,
}

impl HttpBackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeouts(base_url, TimeoutConfig::global())
    }

    pub fn with_timeouts(base_url: &str, timeouts: &TimeoutConfig) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid backend URL: {}", base_url))?;

        // join() replaces the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeouts.http_request)
            .connect_timeout(timeouts.connect)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, command: &str) -> Result<Url, CallError> {
        self.base_url
            .join(&format!("api/{}", command))
            .map_err(|e| CallError::Transport(format!("Invalid command path '{}': {}", command, e)))
    }

    async fn post(&self, command: &str, args: &CallArgs) -> Result<Value, CallError> {
        let url = self.endpoint(command)?;
        let request_id = Uuid::new_v4().to_string();

        let response = self
            .client
            .post(url)
            .header(REQUEST_ID_HEADER, &request_id)
            .json(args)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CallError::Transport(format!(
                "HTTP {}: {}",
                status,
                excerpt(&body, ERROR_BODY_EXCERPT)
            )));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let reply: Value = serde_json::from_str(&body).map_err(|e| {
            CallError::Decode(format!(
                "{} (body: {})",
                e,
                excerpt(&body, ERROR_BODY_EXCERPT)
            ))
        })?;

        KittyResponse::unwrap_payload(reply)
    }
}

#[async_trait]
impl BackendCaller for HttpBackendClient {
    async fn call(&self, command: &str, args: CallArgs) -> Result<Value, CallError> {
        let started = Instant::now();
        let result = self.post(command, &args).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(command, elapsed_ms, "Backend call completed"),
            Err(e) => warn!(command, elapsed_ms, error = %e, "Backend call failed"),
        }

        result
    }
}
