use relief_core::store::ReportStore;
use relief_server::config::ServerConfig;
use relief_server::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relief_core=debug,relief_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = ReportStore::open(&config.db_path)?;
    let app = relief_server::app(AppState { store }, config.static_dir.as_deref());

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("relief-server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
