use jiff::Timestamp;
use rand::{SeedableRng, rngs::StdRng};
use reelrank::{
    config::Config, db, generator::Generator, init_tracing, stats::Statistics, store::SqlStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let settings = &config.generator;
    let db = db::connect_and_migrate(&config.database_url).await?;

    info!(
        seed = settings.seed,
        batch_size = settings.batch_size,
        users = settings.users,
        movies = settings.movies,
        ratings = settings.ratings,
        "generating data"
    );

    let rng = StdRng::seed_from_u64(settings.seed);
    let mut generator = Generator::new(rng, Timestamp::now(), settings.batch_size);

    let users = generator.users(&db, settings.users).await?;
    let movies = generator.movies(&db, settings.movies).await?;
    let ratings = generator.ratings(&db, settings.ratings).await?;
    info!(users, movies, ratings, "generation finished");

    let dashboard = Statistics::new(SqlStore::new(db)).dashboard().await?;
    println!("{dashboard}");

    Ok(())
}
