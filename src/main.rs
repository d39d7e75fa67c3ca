use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coupon_admin::auth::{
    cleanup_task::start_revocation_sweep, Clock, InMemoryRevocationStore, RedisRevocationStore,
    RevocationStore, SessionService, SystemClock,
};
use coupon_admin::{build_router, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coupon_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coupon admin server");

    let cfg = config::load()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    let revocations: Arc<dyn RevocationStore> = match &cfg.redis_url {
        Some(url) => {
            info!("Connecting to Redis...");
            let store = RedisRevocationStore::connect(url).await?;
            Arc::new(store) as Arc<dyn RevocationStore>
        }
        None => {
            warn!("REDIS_URL not set, keeping revocations in memory");
            let store = Arc::new(InMemoryRevocationStore::new(clock.clone()));
            tokio::spawn(start_revocation_sweep(
                store.clone(),
                cfg.revocation_sweep_interval,
            ));
            store as Arc<dyn RevocationStore>
        }
    };

    let session_service = Arc::new(SessionService::new(cfg.auth.clone(), revocations, clock));
    let app_state = AppState::new(session_service, cfg.cookie.clone());
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&cfg.server_addr).await?;
    info!(addr = %cfg.server_addr, "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down...");
}
