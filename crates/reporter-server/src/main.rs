use std::net::SocketAddr;

use tracing::{info, warn};

use reporter_api::auth::AppStateInner;
use reporter_api::config::Config;
use reporter_api::router;
use reporter_api::token::TokenCodec;
use reporter_store::TenantStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reporter=debug,reporter_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_dev_secret() {
        warn!("JWT_SECRET is unset; using the development secret. Do not run like this in production.");
    }

    // Shared state
    let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl);
    let state = AppStateInner::new(TenantStore::new(), codec);

    let app = router::app(state, &config.allowed_origins);

    let addr: SocketAddr = config.bind_addr().parse()?;
    info!("Reporter backend listening on {}", addr);
    info!("Token lifetime: {} hours", config.token_ttl.num_hours());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
