use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use payables_api::app::{build_app, AppServices};
use payables_infra::{Config, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    payables_observability::init();

    let config = Config::from_env().context("invalid configuration")?;
    let stores = build_stores(&config).await?;
    let services = AppServices::from_config(&config, stores).context("failed to build services")?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    use payables_infra::store::postgres;

    match config.database_url.as_deref() {
        Some(url) => {
            let pool = postgres::connect(url).await.context("failed to connect to Postgres")?;
            postgres::ensure_schema(&pool).await.context("failed to prepare schema")?;
            info!("using Postgres record store");
            Ok(Stores::postgres(pool))
        }
        None => {
            warn!("DATABASE_URL not set; records are kept in memory only");
            Ok(Stores::in_memory())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    if config.database_url.is_some() {
        warn!("DATABASE_URL is set but this build has no Postgres support; using the in-memory store");
    }
    Ok(Stores::in_memory())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
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

    info!("shutdown signal received");
}
