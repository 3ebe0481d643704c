use std::{env, str::FromStr};

use anyhow::{Context, Result, bail};
use tracing::warn;

use super::{
    config_model::{App, Auth, BackendServer, CoinEconomy, Database, DotEnvyConfig, Omise},
    stage::Stage,
};

const DEFAULT_OMISE_API_BASE_URL: &str = "https://api.omise.co";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let stage = get_stage()?;

    let backend_server = BackendServer {
        port: parse_required("SERVER_PORT_BACKEND")?,
        body_limit: parse_required("SERVER_BODY_LIMIT")?,
        timeout: parse_required("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let auth = Auth {
        jwt_secret: required("JWT_SECRET")?,
    };

    let omise = Omise {
        secret_key: required("OMISE_SECRET_KEY")?,
        api_base_url: optional("OMISE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OMISE_API_BASE_URL.to_string()),
        request_timeout: parse_optional("OMISE_REQUEST_TIMEOUT", 15)?,
        webhook_secret: optional("OMISE_WEBHOOK_SECRET"),
        allow_unsigned_webhooks: parse_optional("ALLOW_UNSIGNED_WEBHOOKS", false)?,
    };
    check_webhook_policy(stage, &omise)?;

    let app = App {
        public_url: required("APP_PUBLIC_URL")?,
    };

    let coin_economy = CoinEconomy {
        currency: optional("PAYMENT_CURRENCY").unwrap_or_else(|| "THB".to_string()),
        writer_revenue_percent: parse_optional("WRITER_REVENUE_PERCENT", 70)?,
        coin_average_rate_minor: parse_optional("COIN_AVERAGE_RATE_MINOR", 90)?,
    };

    Ok(DotEnvyConfig {
        stage,
        backend_server,
        database,
        auth,
        omise,
        app,
        coin_economy,
    })
}

/// Unset means `local`. Anything else must name a stage, so a misspelled
/// production stage cannot slip past the production-only checks.
pub fn get_stage() -> Result<Stage> {
    dotenvy::dotenv().ok();

    parse_stage(optional("STAGE"))
}

fn parse_stage(raw: Option<String>) -> Result<Stage> {
    match raw {
        Some(value) => Stage::try_from(&value).context("STAGE is invalid"),
        None => Ok(Stage::default()),
    }
}

pub fn get_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    required("JWT_SECRET")
}

/// Unsigned webhooks are only accepted when no secret is configured, and in
/// production only with an explicit opt-in.
fn check_webhook_policy(stage: Stage, omise: &Omise) -> Result<()> {
    if omise.webhook_secret.is_some() {
        return Ok(());
    }

    if stage == Stage::Production && !omise.allow_unsigned_webhooks {
        bail!(
            "OMISE_WEBHOOK_SECRET is required in production; set ALLOW_UNSIGNED_WEBHOOKS=true to accept unsigned webhooks"
        );
    }

    warn!(
        %stage,
        allow_unsigned_webhooks = omise.allow_unsigned_webhooks,
        "config: OMISE_WEBHOOK_SECRET is not set, webhook signatures will NOT be verified"
    );
    Ok(())
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{} is invalid", key))
}

fn parse_required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .parse::<T>()
        .with_context(|| format!("{} is invalid", key))
}

fn parse_optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} is invalid", key)),
        None => Ok(default),
    }
}
