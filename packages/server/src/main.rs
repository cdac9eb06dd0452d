use std::net::SocketAddr;

use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::seed::ensure_indexes;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database).await?;
    ensure_indexes(&db).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(db, config);
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
