use clap::Parser;
use marksix::api::{create_router, AppState};
use marksix::cli::{self, Cli, Commands};
use marksix::collector::HkjcClient;
use marksix::config::AppConfig;
use marksix::error::{MarksixError, Result};
use marksix::store::DrawStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    if let Err(errors) = config.validate() {
        return Err(MarksixError::Validation(errors.join("; ")));
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            init_logging(&config);
            run_server(config, port).await?;
        }
        Some(Commands::Predict { skip_fetch }) => {
            init_logging_simple();
            cli::run_predict(&config, skip_fetch).await?;
        }
        Some(Commands::Cases { limit, show_all }) => {
            init_logging_simple();
            cli::run_cases(&config, limit, show_all).await?;
        }
        Some(Commands::Fetch) => {
            init_logging(&config);
            cli::run_fetch(&config).await?;
        }
        Some(Commands::Gann { seed }) => {
            init_logging_simple();
            cli::run_gann(&config, &seed).await?;
        }
        None => {
            init_logging(&config);
            run_server(config, None).await?;
        }
    }

    Ok(())
}

async fn run_server(config: AppConfig, port_override: Option<u16>) -> Result<()> {
    let store = Arc::new(DrawStore::new(&config.data.snapshot_path));
    let preloaded = store.history();
    if preloaded.is_empty() {
        warn!("no draws in snapshot; first prediction request will fetch from HKJC");
    } else {
        info!(draws = preloaded.len(), "historical draws loaded");
    }

    let fetcher = Arc::new(HkjcClient::new(config.hkjc.clone())?);
    let state = AppState::new(store, Some(fetcher), config.backtest.clone());
    let router = create_router(state);

    let port = port_override.unwrap_or(config.server.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "marksix server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("marksix server stopped");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},marksix=debug", config.logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
