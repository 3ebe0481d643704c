mod config;

use anyhow::{Context, Result};
use config::ObservabilityConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber for `component`.
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`. Fails if a subscriber is
/// already installed.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(config.default_level.as_str().to_ascii_lowercase()),
    };

    // Local time so `TZ=Asia/Bangkok` shows `+07:00` in logs.
    let fmt_layer = fmt::layer()
        .with_ansi(config.ansi)
        .with_timer(fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    let service = &config.service_context;
    for warning in &config.warnings {
        warn!(
            service = %service.service_name,
            warning = %warning,
            "observability: ignored invalid setting"
        );
    }

    info!(
        service = %service.service_name,
        environment = %service.environment,
        component = %service.component,
        level = %config.default_level,
        "observability: logging ready"
    );

    Ok(())
}
