use anyhow::anyhow;
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::{LikeExpr, OnConflict},
};
use tracing::debug;

use super::{CatalogueView, SqlStore, enrich, now_sec, ratings_of};
use crate::{
    entities::{genre, movie, rating},
    error::{AppResult, RequestError},
    models::{Genre, NewMovie, RatedMovie},
};

#[async_trait]
impl CatalogueView for SqlStore {
    async fn all_movies(&self) -> AppResult<Vec<RatedMovie>> {
        let txn = self.db.begin().await?;
        let rows = movie::Entity::find()
            .find_also_related(genre::Entity)
            .order_by_asc(movie::Column::Title)
            .all(&txn)
            .await?;
        let ratings = rating::Entity::find().all(&txn).await?;
        txn.commit().await?;

        Ok(enrich(rows, &ratings))
    }

    async fn movie_by_id(&self, id: i32) -> AppResult<Option<RatedMovie>> {
        let txn = self.db.begin().await?;
        let row = movie::Entity::find_by_id(id).find_also_related(genre::Entity).one(&txn).await?;
        let Some(row) = row else {
            txn.commit().await?;
            return Ok(None);
        };
        let ratings = ratings_of(&txn, &[id]).await?;
        txn.commit().await?;

        Ok(enrich(vec![row], &ratings).pop())
    }

    async fn movies_by_genre(&self, genre_id: i32) -> AppResult<Vec<RatedMovie>> {
        let txn = self.db.begin().await?;
        let rows = movie::Entity::find()
            .filter(movie::Column::GenreId.eq(genre_id))
            .find_also_related(genre::Entity)
            .all(&txn)
            .await?;
        let ids: Vec<i32> = rows.iter().map(|(m, _)| m.id).collect();
        let ratings = ratings_of(&txn, &ids).await?;
        txn.commit().await?;

        let mut movies = enrich(rows, &ratings);
        movies.sort_by(|a, b| {
            b.average_rating.total_cmp(&a.average_rating).then_with(|| a.id().cmp(&b.id()))
        });
        Ok(movies)
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }

    async fn search_movies(&self, fragment: &str) -> AppResult<Vec<RatedMovie>> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.db.begin().await?;
        let rows = movie::Entity::find()
            .filter(movie::Column::Title.like(title_pattern(fragment)))
            .find_also_related(genre::Entity)
            .order_by_asc(movie::Column::Title)
            .all(&txn)
            .await?;
        let ids: Vec<i32> = rows.iter().map(|(m, _)| m.id).collect();
        let ratings = ratings_of(&txn, &ids).await?;
        txn.commit().await?;

        debug!(fragment = %fragment, matches = rows.len(), "title search");
        Ok(enrich(rows, &ratings))
    }
}

impl SqlStore {
    pub async fn add_movie(&self, new: NewMovie) -> AppResult<RatedMovie> {
        if new.title.trim().is_empty() {
            return Err(RequestError::EmptyTitle.into());
        }
        if genre::Entity::find_by_id(new.genre_id).one(&self.db).await?.is_none() {
            return Err(RequestError::UnknownGenre(new.genre_id).into());
        }

        let res = movie::Entity::insert(active_movie(&new, now_sec())).exec(&self.db).await?;
        let id = res.last_insert_id;
        debug!(movie_id = id, title = %new.title.trim(), "movie added");

        self.movie_by_id(id).await?.ok_or_else(|| anyhow!("movie {id} missing after insert").into())
    }

    pub async fn import_movies(&self, movies: &[NewMovie]) -> AppResult<u64> {
        let now = now_sec();
        let models: Vec<movie::ActiveModel> = movies
            .iter()
            .filter(|m| !m.title.trim().is_empty())
            .map(|m| active_movie(m, now))
            .collect();
        if models.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        let written = movie::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(movie::Column::TmdbId)
                    .update_columns([
                        movie::Column::Title,
                        movie::Column::ReleaseYear,
                        movie::Column::GenreId,
                        movie::Column::Director,
                        movie::Column::Description,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        Ok(written)
    }
}

fn title_pattern(fragment: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn active_movie(new: &NewMovie, now: i64) -> movie::ActiveModel {
    movie::ActiveModel {
        id: Default::default(),
        tmdb_id: Set(new.tmdb_id),
        title: Set(new.title.trim().to_string()),
        release_year: Set(new.release_year),
        genre_id: Set(new.genre_id),
        director: Set(new.director.clone()),
        description: Set(new.description.clone()),
        created_at: Set(now),
    }
}
