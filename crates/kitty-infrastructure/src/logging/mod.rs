//! Process-wide logging.
//!
//! - one-line JSON records in a daily rolling file
//! - coloured human-readable stdout in debug builds
//! - `log` crate records bridged into `tracing`
//! - backend log lines re-emitted under the `backend` target
//!
//! JSON records carry `timestamp` (ISO 8601, milliseconds, local offset),
//! `level`, `target`, `pid`, `tid`, `file`/`line`, `message`, `fields`,
//! `source` (`ui` or `backend`) and `version`.

mod format;

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use format::{HumanReadableFormatter, JsonLineFormatter};

pub const LOG_FILE_PREFIX: &str = "kitty-ui.log";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();
static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logger(log_dir: PathBuf) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;
    let _ = LOG_DIR.set(log_dir.clone());

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(JsonLineFormatter::new(env!("CARGO_PKG_VERSION")))
        .with_filter(env_filter(default_file_directives()));

    let stdout_layer = cfg!(debug_assertions).then(|| {
        fmt::layer()
            .with_ansi(true)
            .event_format(HumanReadableFormatter::new())
            .with_filter(env_filter("debug,kitty=trace"))
    });

    let subscriber = Registry::default().with(file_layer).with(stdout_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "kitty::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Logger initialized"
    );

    Ok(())
}

fn default_file_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,kitty=trace,hyper=info,reqwest=info"
    } else {
        "info"
    }
}

/// `RUST_LOG` wins over the built-in directives
fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Directory chosen by [`init_logger`], if it ran
pub fn get_log_dir() -> Option<PathBuf> {
    LOG_DIR.get().cloned()
}

/// Severity of a backend log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Guess the severity from the level token near the start of the line
/// (`[WARN]`, `ERROR ...`, `2024-01-01T00:00:00Z DEBUG ...`). Defaults to info.
pub fn parse_backend_level(line: &str) -> BackendLevel {
    let head: String = line.chars().take(48).collect::<String>().to_uppercase();
    let tokens = head.split(|c: char| !c.is_ascii_alphabetic());

    for token in tokens {
        match token {
            "ERROR" | "ERR" | "FATAL" => return BackendLevel::Error,
            "WARN" | "WARNING" => return BackendLevel::Warn,
            "INFO" => return BackendLevel::Info,
            "DEBUG" => return BackendLevel::Debug,
            "TRACE" => return BackendLevel::Trace,
            _ => {}
        }
    }
    BackendLevel::Info
}

/// Re-emit a backend log line under the `backend` target
pub fn ingest_backend_log(line: &str) -> BackendLevel {
    let line = line.trim_end();
    let level = parse_backend_level(line);

    match level {
        BackendLevel::Error => tracing::error!(target: "backend", source = "backend", "{}", line),
        BackendLevel::Warn => tracing::warn!(target: "backend", source = "backend", "{}", line),
        BackendLevel::Info => tracing::info!(target: "backend", source = "backend", "{}", line),
        BackendLevel::Debug => tracing::debug!(target: "backend", source = "backend", "{}", line),
        BackendLevel::Trace => tracing::trace!(target: "backend", source = "backend", "{}", line),
    }

    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_level() {
        assert_eq!(parse_backend_level("[WARN] port in use"), BackendLevel::Warn);
        assert_eq!(
            parse_backend_level("2024-05-01T10:00:00Z ERROR xray exited"),
            BackendLevel::Error
        );
        assert_eq!(parse_backend_level("debug: dialing"), BackendLevel::Debug);
        assert_eq!(parse_backend_level("plain message"), BackendLevel::Info);
    }

    #[test]
    fn test_level_token_must_be_whole_word() {
        assert_eq!(parse_backend_level("DEBUGGER attached"), BackendLevel::Info);
        assert_eq!(parse_backend_level("no errors found"), BackendLevel::Info);
    }

    #[test]
    fn test_ingest_without_subscriber_reports_level() {
        assert_eq!(ingest_backend_log("[TRACE] tick\n"), BackendLevel::Trace);
    }
}
