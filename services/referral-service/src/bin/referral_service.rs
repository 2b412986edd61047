use anyhow::Result;
use tokio::net::TcpListener;

use referral_common::EnvVars;
use referral_database::init_databases;
use referral_runtime::{CleanupTask, MongoStore};
use referral_service_api::{build_router, setup_tracing, ApiServerEnv, GlobalState};

init_databases!(
    default: [
        referral_runtime::User,
        referral_runtime::Job,
        referral_runtime::Referral
    ]
);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let env = ApiServerEnv::load()?;
    let db = connect_database(true).await?;
    let store = MongoStore::new(db.clone());

    let cleanup = CleanupTask::spawn(store.clone(), env.cleanup_interval());
    let app = build_router(
        GlobalState::new(store, env.auth_config()),
        env.request_timeout(),
    );

    let listener = TcpListener::bind(format!(":::{}", env.port)).await?;
    tracing::info!("LISTENING ON {}", env.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.shutdown().await;
    tracing::info!("referral service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("[shutdown_signal] failed to listen for ctrl-c: {}", e);
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
                tracing::error!("[shutdown_signal] failed to listen for SIGTERM: {}", e);
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
    tracing::info!("[shutdown_signal] shutting down");
}
