//! Drives [`crate::pipeline::run_once`] on a fixed interval, forever, until the
//! process receives a shutdown signal.

use sqlx::PgPool;
use tracing::{error, info};

use crate::config::Config;
use crate::pipeline;

pub async fn run(config: Config, pool: PgPool) {
    if !config.start_delay().is_zero() {
        info!(delay = ?config.start_delay(), "sleeping before first run");
        tokio::select! {
            _ = tokio::time::sleep(config.start_delay()) => {}
            _ = shutdown_signal() => return,
        }
    }

    loop {
        if let Err(err) = pipeline::run_once(&config, &pool).await {
            error!(%err, "run failed, will retry after the usual interval");
        }

        tokio::select! {
            _ = tokio::time::sleep(config.polling_time()) => {}
            _ = shutdown_signal() => {
                info!("shutdown signal received, exiting");
                return;
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
