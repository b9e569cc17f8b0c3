use kitty_lib::application::config::AppConfig;
use kitty_lib::presentation::bootstrap::build_from_config;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    match kitty_infrastructure::logging::init_logger(config.log_dir.clone()) {
        Ok(_) => {
            info!("🚀 Kitty starting...");
            info!("📝 File logging initialized at: {}", config.log_dir.display());
        }
        Err(e) => {
            eprintln!("⚠️  Failed to initialize file logging: {}", e);
            eprintln!("   Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .try_init();
        }
    }

    let ctx = match build_from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("❌ Failed to initialize application context: {:#}", e);
            return Err(e);
        }
    };

    if let Err(e) = ctx.services.settings.init().await {
        warn!("Backend config unavailable, using defaults: {}", e);
    }
    if let Err(e) = ctx.refresh_proxies().await {
        warn!("Proxy list unavailable: {}", e);
    }

    if let Err(e) = ctx.services.auto_update.start().await {
        warn!("Subscription auto-update unavailable: {}", e);
    }
    info!(
        "✅ Kitty ready, subscriptions refresh daily at {:02}:00",
        ctx.services.auto_update.hour().await
    );

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutdown requested");

    if tokio::time::timeout(config.timeouts.shutdown_grace, ctx.shutdown())
        .await
        .is_err()
    {
        warn!(
            "Shutdown did not finish within {:?}",
            config.timeouts.shutdown_grace
        );
    }

    Ok(())
}
