use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    domain::value_objects::revenue_share::RevenueShare,
    infra::db::postgres::postgres_connection::PgPoolSquad,
    payments::{omise_client::OmiseClient, omise_webhook::WebhookVerifier},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let omise_client = Arc::new(OmiseClient::new(
        config.omise.secret_key.clone(),
        config.omise.api_base_url.clone(),
        Duration::from_secs(config.omise.request_timeout),
    )?);
    let verifier = WebhookVerifier::new(config.omise.webhook_secret.clone());
    let revenue_share = RevenueShare::new(
        config.coin_economy.writer_revenue_percent,
        config.coin_economy.coin_average_rate_minor,
    )?;
    info!(
        webhook_signing = verifier.is_signing_enforced(),
        writer_revenue_percent = revenue_share.percent(),
        coin_average_rate_minor = revenue_share.minor_per_coin(),
        currency = %config.coin_economy.currency,
        "coin economy configured"
    );

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/coins",
            routers::coins::routes(Arc::clone(&db_pool), Arc::clone(&config), omise_client),
        )
        .nest(
            "/api/v1/webhooks",
            routers::webhooks::routes(Arc::clone(&db_pool), verifier),
        )
        .nest(
            "/api/v1/chapters",
            routers::chapters::routes(Arc::clone(&db_pool), revenue_share),
        )
        .nest(
            "/api/v1/writer",
            routers::writer_revenue::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin",
            routers::admin::routes(
                Arc::clone(&db_pool),
                config.coin_economy.currency.clone(),
            ),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(stage = %config.stage, "Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
