mod accounts;
mod blog;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod forms;
mod markdown;
mod models;
mod pagination;
mod routes;
mod search;
mod session;
mod templates;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{accounts::Accounts, blog::Blog, catalog::Catalog, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub accounts: Accounts,
    pub catalog: Catalog,
    pub blog: Blog,
    key: Key,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection, key: Key) -> Self {
        let catalog = Catalog::new(db.clone(), config.page_size, config.autocomplete_limit);
        let blog = Blog::new(db.clone(), config.page_size);
        Self { config: Arc::new(config), accounts: Accounts::new(db), catalog, blog, key }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

fn signing_key(config: &Config) -> anyhow::Result<Key> {
    match &config.secret_key {
        Some(secret) => Key::try_from(secret.as_bytes()).context("SECRET_KEY must be at least 64 bytes"),
        None => {
            tracing::warn!("SECRET_KEY not set, sessions will not survive a restart");
            Ok(Key::generate())
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,films=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    let key = signing_key(&config)?;
    let db = db::connect_and_migrate(&config.database_url).await.context("opening database")?;
    let addr = config.addr;

    let state = AppState::new(config, db, key);

    if let (Some(username), Some(password)) =
        (state.config.admin_username.as_deref(), state.config.admin_password.as_deref())
    {
        let admin = state
            .accounts
            .ensure_admin(username, password)
            .await
            .map_err(|e| anyhow::anyhow!("bootstrapping admin account: {e}"))?;
        tracing::debug!(user_id = admin.id, "admin bootstrap done");
    }

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
