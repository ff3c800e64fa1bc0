use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::OnConflict,
};
use tracing::debug;

use super::{RatingStore, SqlStore};
use crate::{
    entities::{movie, rating, user},
    error::{AppResult, RequestError},
    models::{Rating, Review, SCORE_RANGE},
};

#[async_trait]
impl RatingStore for SqlStore {
    async fn ratings_by_user(&self, user_id: i32) -> AppResult<Vec<Rating>> {
        let rows = rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .order_by_desc(rating::Column::RatedAt)
            .order_by_desc(rating::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Rating::from).collect())
    }

    async fn ratings_by_movie(&self, movie_id: i32) -> AppResult<Vec<Review>> {
        let rows = rating::Entity::find()
            .filter(rating::Column::MovieId.eq(movie_id))
            .find_also_related(user::Entity)
            .order_by_desc(rating::Column::RatedAt)
            .order_by_desc(rating::Column::Id)
            .all(&self.db)
            .await?;
        Ok(with_titles(&self.db, rows).await?)
    }

    async fn rating_for(&self, user_id: i32, movie_id: i32) -> AppResult<Option<Rating>> {
        let row = rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::MovieId.eq(movie_id))
            .one(&self.db)
            .await?;
        Ok(row.map(Rating::from))
    }

    async fn upsert_rating(
        &self,
        user_id: i32,
        movie_id: i32,
        score: i32,
        review_text: Option<&str>,
    ) -> AppResult<Rating> {
        self.upsert_rating_at(user_id, movie_id, score, review_text, jiff::Timestamp::now()).await
    }

    async fn latest_reviewed(&self, limit: usize) -> AppResult<Vec<Review>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let rows = rating::Entity::find()
            .filter(rating::Column::ReviewText.is_not_null())
            .filter(rating::Column::ReviewText.ne(""))
            .find_also_related(user::Entity)
            .order_by_desc(rating::Column::RatedAt)
            .order_by_desc(rating::Column::Id)
            .limit(limit as u64)
            .all(&self.db)
            .await?;
        Ok(with_titles(&self.db, rows).await?)
    }
}

impl SqlStore {
    pub async fn upsert_rating_at(
        &self,
        user_id: i32,
        movie_id: i32,
        score: i32,
        review_text: Option<&str>,
        at: jiff::Timestamp,
    ) -> AppResult<Rating> {
        if !SCORE_RANGE.contains(&score) {
            return Err(RequestError::ScoreOutOfRange(score).into());
        }
        // Users and movies are never deleted, so these lookups cannot go stale
        // before the write below.
        if user::Entity::find_by_id(user_id).one(&self.db).await?.is_none() {
            return Err(RequestError::UnknownUser(user_id).into());
        }
        if movie::Entity::find_by_id(movie_id).one(&self.db).await?.is_none() {
            return Err(RequestError::UnknownMovie(movie_id).into());
        }

        let review_text = review_text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        let model = rating::ActiveModel {
            id: Default::default(),
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            score: Set(score),
            review_text: Set(review_text),
            rated_at: Set(at.as_second()),
        };

        rating::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([rating::Column::UserId, rating::Column::MovieId])
                    .update_columns([
                        rating::Column::Score,
                        rating::Column::ReviewText,
                        rating::Column::RatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!(user_id, movie_id, score, "rating stored");

        self.rating_for(user_id, movie_id)
            .await?
            .ok_or_else(|| anyhow!("rating ({user_id}, {movie_id}) missing after upsert").into())
    }
}

async fn with_titles<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<(rating::Model, Option<user::Model>)>,
) -> Result<Vec<Review>, DbErr> {
    let mut ids: Vec<i32> = rows.iter().map(|(r, _)| r.movie_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let titles: HashMap<i32, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        movie::Entity::find()
            .filter(movie::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|m| (m.id, m.title))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|(rating, user)| Review {
            movie_title: titles.get(&rating.movie_id).cloned(),
            username: user.map(|u| u.username),
            rating: rating.into(),
        })
        .collect())
}
