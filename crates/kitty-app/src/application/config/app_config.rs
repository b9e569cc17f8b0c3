use kitty_domain::DomainError;
use kitty_infrastructure::config::TimeoutConfig;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:11451";

const ENV_BACKEND_URL: &str = "KITTY_BACKEND_URL";
const ENV_DATA_DIR: &str = "KITTY_DATA_DIR";
const ENV_LOG_DIR: &str = "KITTY_LOG_DIR";

/// Host process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: Url,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub timeouts: TimeoutConfig,
}

impl AppConfig {
    /// Read `KITTY_BACKEND_URL`, `KITTY_DATA_DIR` and `KITTY_LOG_DIR`
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = value(ENV_BACKEND_URL).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = Url::parse(raw_url.trim()).map_err(|e| {
            DomainError::Validation(format!("Invalid {ENV_BACKEND_URL} '{raw_url}': {e}"))
        })?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(DomainError::Validation(format!(
                "{ENV_BACKEND_URL} must be an http(s) URL, got '{raw_url}'"
            )));
        }

        let data_dir = value(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let log_dir = value(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        Ok(Self {
            backend_url,
            data_dir,
            log_dir,
            timeouts: TimeoutConfig::global().clone(),
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("kitty")
}
