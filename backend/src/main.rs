//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{Adapters, ServerConfig, build_http_state, create_server};
use site_backend::inbound::http::health::HealthState;
use site_backend::inbound::http::session_config::fingerprint::key_fingerprint;
use site_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use site_backend::settings::AppSettings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let mode = BuildMode::from_debug_assertions();
    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session =
        session_settings_from_env(&DefaultEnv::new(), mode).map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        ephemeral = session.ephemeral,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let adapters = Adapters::from_settings(&settings, mode)?;
    let http_state = build_http_state(adapters, &settings)?;

    let config = ServerConfig::new(session, bind_addr);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(make_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Option<PrometheusMetrics> {
    match PrometheusMetricsBuilder::new("site")
        .endpoint("/metrics")
        .build()
    {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "metrics disabled: Prometheus registration failed");
            None
        }
    }
}
