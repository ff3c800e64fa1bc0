use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(pk_auto(Genres::Id))
                    .col(string_uniq(Genres::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(integer_null(Movies::TmdbId))
                    .col(string(Movies::Title))
                    .col(integer_null(Movies::ReleaseYear))
                    .col(integer(Movies::GenreId))
                    .col(string_null(Movies::Director))
                    .col(text_null(Movies::Description))
                    .col(big_integer(Movies::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_genre")
                            .from(Movies::Table, Movies::GenreId)
                            .to(Genres::Table, Genres::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_tmdb_id")
                    .table(Movies::Table)
                    .col(Movies::TmdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_genre")
                    .table(Movies::Table)
                    .col(Movies::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_uniq(Users::Username))
                    .col(big_integer(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(pk_auto(Ratings::Id))
                    .col(integer(Ratings::UserId))
                    .col(integer(Ratings::MovieId))
                    .col(integer(Ratings::Score))
                    .col(text_null(Ratings::ReviewText))
                    .col(big_integer(Ratings::RatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_user")
                            .from(Ratings::Table, Ratings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_movie")
                            .from(Ratings::Table, Ratings::MovieId)
                            .to(Movies::Table, Movies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per (user, movie); upserts conflict on this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_user_movie")
                    .table(Ratings::Table)
                    .col(Ratings::UserId)
                    .col(Ratings::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_movie")
                    .table(Ratings::Table)
                    .col(Ratings::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_rated_at")
                    .table(Ratings::Table)
                    .col(Ratings::RatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ratings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Genres {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    TmdbId,
    Title,
    ReleaseYear,
    GenreId,
    Director,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    UserId,
    MovieId,
    Score,
    ReviewText,
    RatedAt,
}
