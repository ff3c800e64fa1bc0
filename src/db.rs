use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::debug;

use crate::error::AppResult;

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let in_memory = database_url.contains(":memory:");

    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false).connect_timeout(Duration::from_secs(10));
    if in_memory {
        // Every pooled connection would otherwise open its own empty database.
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    if !in_memory {
        pragma(&db, "PRAGMA journal_mode=WAL").await?;
        pragma(&db, "PRAGMA synchronous=NORMAL").await?;
        pragma(&db, "PRAGMA cache_size=-64000").await?;
    }

    Migrator::up(&db, None).await?;
    debug!(database_url = %database_url, "database ready");

    Ok(db)
}

async fn pragma(db: &DatabaseConnection, sql: &str) -> AppResult<()> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string())).await?;
    Ok(())
}
