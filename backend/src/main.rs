use anyhow::Result;
use backend::{axum_http::http_serve, config::config_loader};
use crates::{infra::db::postgres::postgres_connection, observability};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Nothing can be logged through tracing until this succeeds.
    if let Err(err) = observability::init_observability("backend") {
        eprintln!("backend: failed to initialise logging: {err:#}");
        std::process::exit(1);
    }

    if let Err(err) = run().await {
        error!(error = ?err, "backend: exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Arc::new(config_loader::load()?);
    info!(stage = %config.stage, "backend: configuration loaded");

    let db_pool = Arc::new(postgres_connection::establish_connection(&config.database.url)?);
    info!("backend: postgres pool ready");

    http_serve::start(config, db_pool).await
}
