use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use weebot_core::WeebotConfig;

use weebot_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "weebot.toml")]
    config: String,

    /// Validate config and credentials, then exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match WeebotConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging
    let rust_log = std::env::var("RUST_LOG").ok();
    fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), &config.service.log_level))
        .init();

    if args.health {
        println!("✅ Config loaded from {}", args.config);
        match config.llm.api_key() {
            Some(_) => println!("✅ {} is set (model {})", config.llm.api_key_env, config.llm.model),
            None => {
                println!("❌ {} is not set — gateway would serve fallbacks only", config.llm.api_key_env);
                std::process::exit(1);
            }
        }
        println!("✅ WeeBot health check passed");
        return Ok(());
    }

    let generator = weebot_core::create_generator(&config.llm)?;
    tracing::info!(
        generator = generator.name(),
        model = %config.llm.model,
        "Text generator ready"
    );

    let state = Arc::new(HttpState {
        generator: Arc::from(generator),
        config,
    });

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(state, tx.subscribe()).await?;

    Ok(())
}

/// A non-empty `RUST_LOG` replaces the configured level entirely.
fn log_filter(rust_log: Option<&str>, configured: &str) -> EnvFilter {
    match rust_log.filter(|spec| !spec.trim().is_empty()) {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_uses_configured_level_without_rust_log() {
        let filter = log_filter(None, "debug").to_string().to_lowercase();
        assert_eq!(filter, "debug");

        let filter = log_filter(Some("  "), "warn").to_string().to_lowercase();
        assert_eq!(filter, "warn");
    }

    #[test]
    fn test_log_filter_rust_log_wins() {
        let filter = log_filter(Some("error"), "debug").to_string().to_lowercase();
        assert_eq!(filter, "error");
    }

    #[test]
    fn test_log_filter_bad_config_level_falls_back_to_info() {
        let filter = log_filter(None, "weebot=loudest").to_string().to_lowercase();
        assert_eq!(filter, "info");
    }
}
