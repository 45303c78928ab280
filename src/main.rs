use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_bazaar::{
    build_app,
    config::Config,
    connect,
    entities::{seed_admin, setup_schema},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db = connect(&config.database_url, config.db_max_connections).await?;
    setup_schema(&db).await?;

    if let Some(password) = &config.admin_password {
        seed_admin(&db, password).await?;
    }

    let bind_addr = config.bind_addr;
    let app = build_app(Arc::new(db), Arc::new(config));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
