//! YaMDb server entry-point: loads settings, prepares storage and serves the
//! REST API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ortho_config::OrthoConfig;
use yamdb::inbound::http::health::HealthState;
use yamdb::inbound::http::state::HttpState;
use yamdb::outbound::persistence::{DbPool, run_migrations};

use server::{AppSettings, ServerConfig, build_http_state, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn connect(settings: &AppSettings, url: &str) -> std::io::Result<DbPool> {
    if settings.run_migrations {
        run_migrations(url)
            .await
            .map_err(|err| startup_error("migrations failed", err))?;
    }
    let pool_config = settings
        .pool_config(url)
        .map_err(|err| startup_error("invalid settings", err))?;
    DbPool::new(pool_config)
        .await
        .map_err(|err| startup_error("database pool", err))
}

async fn bootstrap_admin(settings: &AppSettings, state: &HttpState) -> std::io::Result<()> {
    let Some((username, email)) = settings
        .bootstrap_admin()
        .map_err(|err| startup_error("invalid settings", err))?
    else {
        return Ok(());
    };
    let admin = state
        .auth
        .bootstrap_admin(username, email)
        .await
        .map_err(|err| startup_error("bootstrap admin", err))?;
    info!(username = %admin.username(), "bootstrap admin ensured");
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| startup_error("configuration", err))?;
    let invalid = |err| startup_error("invalid settings", err);
    let mut config = ServerConfig::new(settings.bind_addr().map_err(invalid)?)
        .with_auth(settings.auth_settings().map_err(invalid)?)
        .with_page_size(settings.page_size().map_err(invalid)?);

    match settings.database_url() {
        Some(url) => config = config.with_db_pool(connect(&settings, url).await?),
        None => warn!("no database configured; using the in-memory store"),
    }

    let http_state = build_http_state(&config);
    bootstrap_admin(&settings, &http_state).await?;

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr, "starting server");
    create_server(health_state, http_state, &config)?.await
}
