use std::time::Duration;

/// Timeouts used by the host process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Whole-request timeout for a backend call over HTTP
    pub http_request: Duration,

    /// TCP connect timeout towards the backend
    pub connect: Duration,

    /// How long shutdown waits for an in-flight refresh
    pub shutdown_grace: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        GLOBAL_TIMEOUT_CONFIG.clone()
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_request(mut self, timeout: Duration) -> Self {
        self.http_request = timeout;
        self
    }

    pub fn with_connect(mut self, timeout: Duration) -> Self {
        self.connect = timeout;
        self
    }

    pub fn with_shutdown_grace(mut self, timeout: Duration) -> Self {
        self.shutdown_grace = timeout;
        self
    }

    /// Get the global timeout configuration
    pub fn global() -> &'static Self {
        &GLOBAL_TIMEOUT_CONFIG
    }
}

static GLOBAL_TIMEOUT_CONFIG: TimeoutConfig = TimeoutConfig {
    http_request: Duration::from_secs(30),
    connect: Duration::from_secs(5),
    shutdown_grace: Duration::from_secs(5),
};
