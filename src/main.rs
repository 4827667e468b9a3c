// LogSift - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading (CLI flags override file values)
// 3. Logging initialisation (debug mode support)
// 4. HTTP listener with graceful shutdown

use clap::Parser;
use logsift::app::aggregator::LogAggregator;
use logsift::platform::config::{self, AppConfig, PlatformPaths};
use logsift::server::{self, AppState};
use logsift::util;
use logsift::util::constants::{APP_NAME, APP_VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// LogSift - consolidated log query service.
///
/// Serves the `.log` files of one directory as a filtered, paginated,
/// newest-first JSON feed.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about)]
struct Cli {
    /// Directory containing the `<logType>.log` files.
    #[arg(short = 'l', long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind.
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Re-parse every file on every request.
    #[arg(long = "no-cache")]
    no_cache: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    /// Apply CLI overrides on top of the file configuration.
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.no_cache {
            config.cache_enabled = false;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is loaded before logging so [logging] can shape the subscriber;
    // its warnings are emitted once tracing is up.
    let (config_path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PlatformPaths::resolve().config_file(), false),
    };
    let (file_config, warnings) = match config::load_config(&config_path, required) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = cli.apply(file_config);

    let _logging = util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    for warning in &warnings {
        tracing::warn!(config = %config_path.display(), "{warning}");
    }

    tracing::info!(
        version = APP_VERSION,
        debug = cli.debug,
        "{APP_NAME} starting"
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: AppConfig) -> std::io::Result<()> {
    let aggregator = LogAggregator::new(config.log_dir.clone(), config.cache_enabled);
    let state = AppState {
        aggregator: Arc::new(aggregator),
        default_page_size: config.default_page_size,
    };
    let app = server::router(state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        log_dir = %config.log_dir.display(),
        cache = config.cache_enabled,
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
