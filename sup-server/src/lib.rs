//! sup-server: REST service for users and messages.
//!
//! Handlers live in [`controllers`], the routing table in [`routes`]; the store
//! client is built once at startup and reaches the handlers through [`AppState`].

use anyhow::Context;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::OnceCell};
use tracing::info;

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use store::{build_sqlite_url, sqlite_url_for_path, Store};

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Store,
    /// Work factor usato per gli hash delle nuove password.
    pub bcrypt_cost: u32,
    /// Hash calcolato al primo login fallito per username sconosciuto, vedi
    /// `auth::verify_credentials`.
    pub dummy_hash: OnceCell<String>,
}

impl AppState {
    pub fn new(store: Store, bcrypt_cost: u32) -> Arc<Self> {
        Arc::new(Self { store, bcrypt_cost, dummy_hash: OnceCell::new() })
    }
}

/// Connette lo store ed esegue le migrazioni.
pub async fn open_store(config: &Config) -> anyhow::Result<Store> {
    let db_url = build_sqlite_url(&config.database_url).context("build sqlite DATABASE_URL")?;
    info!("Using DATABASE_URL = {}", db_url);
    let store = Store::connect(&db_url).await.context("connect to sqlite")?;
    store.migrate().await.context("run migrations")?;
    Ok(store)
}

/// Serve the router on `listener` until `shutdown` resolves, then close the store.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = routes::router(state.clone());
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("server shutdown")?;

    state.store.close().await;
    info!("store closed");
    Ok(())
}
