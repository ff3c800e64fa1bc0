use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub tmdb_pages: u32,
    pub max_concurrent: usize,
    pub generator: GeneratorConfig,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub batch_size: usize,
    pub users: usize,
    pub movies: usize,
    pub ratings: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://reelrank.db?mode=rwc".to_string());

        let tmdb_api_key = std::env::var("TMDB_API_KEY").unwrap_or_default();
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let generator = GeneratorConfig {
            seed: env_or("GENERATOR_SEED", 42),
            batch_size: env_or("GENERATOR_BATCH_SIZE", 200),
            users: env_or("GENERATE_USERS", 100),
            movies: env_or("GENERATE_MOVIES", 1_000),
            ratings: env_or("GENERATE_RATINGS", 10_000),
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_rps: env_or("TMDB_RPS", 4),
            tmdb_pages: env_or("TMDB_PAGES", 5),
            max_concurrent: env_or("MAX_CONCURRENT_REQUESTS", 4),
            generator,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}
