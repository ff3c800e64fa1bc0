use std::time::Duration;

use anyhow::Context;
use reelrank::{
    config::Config,
    db, init_tracing,
    store::SqlStore,
    tmdb::{self, Source, TmdbClient},
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    if config.tmdb_api_key.trim().is_empty() {
        anyhow::bail!("TMDB_API_KEY is required for imports");
    }

    let store = SqlStore::new(db::connect_and_migrate(&config.database_url).await?);

    let http = wreq::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("building HTTP client")?;
    let client = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );

    for source in [Source::Popular, Source::Hindi] {
        let written =
            tmdb::import(&client, &store, source, config.tmdb_pages, config.max_concurrent).await?;
        info!(?source, written, "import finished");
    }

    Ok(())
}
