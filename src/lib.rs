pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod generator;
pub mod models;
pub mod preference;
pub mod recommend;
pub mod routes;
pub mod stats;
pub mod store;
pub mod tmdb;

use crate::store::SqlStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SqlStore,
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelrank=debug,sqlx=warn".to_string()),
        )
        .init();
}
