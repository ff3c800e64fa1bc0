use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_catalogue::Genres;

const DEFAULT_GENRES: &[&str] =
    &["Action", "Comedy", "Drama", "Horror", "Sci-Fi", "Romance", "Thriller"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Genres::Table).columns([Genres::Name]);
        for name in DEFAULT_GENRES {
            insert.values_panic([(*name).into()]);
        }
        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Genres::Table)
                    .and_where(Expr::col(Genres::Name).is_in(DEFAULT_GENRES.iter().copied()))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
