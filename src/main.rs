use std::sync::Arc;

use clap::Parser;
use repasties::config::{Cli, Config, default_config_path};
use repasties::db::ConnectionManager;
use repasties::handler::AppState;
use repasties::highlight::Renderer;
use repasties::snippets::SnippetStore;
use repasties::unpack_error;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("repasties.svc starting");

    // An explicit --config must exist; the default path is optional and the
    // environment fills in when it is absent.
    let cfg = match args.config_path {
        Some(path) => Config::new(&path).unwrap_or_else(|e| {
            tracing::error!(error = %e, path = %path, "failed to load config file");
            std::process::exit(1);
        }),
        None => {
            let path = default_config_path();
            let loaded = if path.exists() {
                Config::new(&path.to_string_lossy())
            } else {
                Config::from_env()
            };
            loaded.unwrap_or_else(|e| {
                tracing::error!(error = %e, path = ?path, "failed to load config");
                std::process::exit(1);
            })
        }
    };

    let connections = ConnectionManager::open(&cfg.store).await.unwrap_or_else(|e| {
        tracing::error!(
            error = %unpack_error(&e),
            host = %cfg.store.host,
            port = cfg.store.port,
            "failed to open snippet store"
        );
        std::process::exit(1);
    });
    let renderer = Renderer::select(&cfg.highlight);
    let store = Arc::new(SnippetStore::new(connections, renderer));

    if let Err(e) = store.bootstrap().await {
        tracing::error!(
            error = %unpack_error(&e),
            host = %cfg.store.host,
            port = cfg.store.port,
            database = %cfg.store.database,
            "failed to bootstrap snippet store"
        );
        std::process::exit(1);
    }

    let address = format!("0.0.0.0:{}", cfg.app.port);
    let cancellation_token = CancellationToken::new();
    let app = repasties::app(AppState { store });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("repasties.svc running on {}", &address);

    let shutdown = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
        shutdown.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await;

    if let Err(err) = result {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }

    tracing::info!("repasties.svc going off, graceful shutdown complete");
}
