//! Backend entry-point: configuration, migrations, and server bootstrap.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use cartshare_backend::domain::ReturnPolicy;
use cartshare_backend::domain::ports::CatalogLookup;
use cartshare_backend::inbound::http::health::HealthState;
use cartshare_backend::outbound::catalog::{RawgCatalogLookup, RawgConfig};
use cartshare_backend::outbound::persistence::{DbPool, PoolConfig};
use cartshare_backend::server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

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

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;

    run_migrations(database_url.clone()).await?;

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("failed to build database pool: {e}")))?;

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let config = ServerConfig::new(
        load_session_key()?,
        cookie_secure,
        SameSite::Lax,
        bind_addr,
        pool,
    )
    .with_return_policy(load_return_policy()?)
    .with_catalog(build_catalog());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %bind_addr, "server started");
    server.await
}

/// Apply pending migrations over a blocking connection before the async
/// pool starts handing out connections.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    let applied = web::block(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| format!("failed to connect for migrations: {e}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|e| format!("failed to run migrations: {e}"))
    })
    .await
    .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
    .map_err(std::io::Error::other)?;

    if applied > 0 {
        info!(applied, "database migrations applied");
    }
    Ok(())
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn load_return_policy() -> std::io::Result<ReturnPolicy> {
    match env::var("RETURN_POLICY") {
        Ok(raw) => ReturnPolicy::from_config(&raw).ok_or_else(|| {
            std::io::Error::other(format!(
                "invalid RETURN_POLICY {raw:?}; expected \"owner-only\" or \"owner-or-borrower\""
            ))
        }),
        Err(_) => Ok(ReturnPolicy::default()),
    }
}

fn build_catalog() -> Arc<dyn CatalogLookup> {
    match env::var("RAWG_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let lookup = RawgConfig::new(api_key)
                .map_err(|e| e.to_string())
                .and_then(|config| RawgCatalogLookup::new(config).map_err(|e| e.to_string()));
            match lookup {
                Ok(lookup) => Arc::new(lookup),
                Err(e) => {
                    warn!(error = %e, "catalog lookup unavailable; covers will not be prefilled");
                    Arc::new(cartshare_backend::domain::ports::NoopCatalogLookup)
                }
            }
        }
        _ => Arc::new(cartshare_backend::domain::ports::NoopCatalogLookup),
    }
}
