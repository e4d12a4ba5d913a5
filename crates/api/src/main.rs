use std::env;

use anyhow::Result;
use waypoint_api::{build_app, ApiConfig};
use waypoint_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("waypoint_api");

    let bind = env::var("WAYPOINT_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let config = ApiConfig::from_env();
    let model = config.model.model.clone();

    let app = build_app(config)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, model = %model, "waypoint travel desk api started");

    axum::serve(listener, app).await?;
    Ok(())
}
