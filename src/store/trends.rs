use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use tracing::debug;

use super::{SqlStore, TrendQuery, now_sec};
use crate::{
    entities::{genre, movie, rating},
    error::AppResult,
    models::{Genre, TrendingGenre},
};

const SECONDS_PER_DAY: i64 = 86_400;

#[async_trait]
impl TrendQuery for SqlStore {
    async fn trending_genres(&self, days: u32, limit: usize) -> AppResult<Vec<TrendingGenre>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let cutoff = window_start(now_sec(), days);

        let txn = self.db.begin().await?;
        let recent = rating::Entity::find()
            .filter(rating::Column::RatedAt.gte(cutoff))
            .all(&txn)
            .await?;
        let movie_genres: HashMap<i32, i32> = movie::Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| (m.id, m.genre_id))
            .collect();
        let genres = genre::Entity::find().all(&txn).await?;
        txn.commit().await?;

        let counts = count_by_genre(recent.iter().map(|r| r.movie_id), &movie_genres);
        debug!(days, in_window = recent.len(), genres = counts.len(), "trend window counted");

        Ok(rank(genres.into_iter().map(Genre::from), &counts, limit))
    }
}

fn window_start(now: i64, days: u32) -> i64 {
    now.saturating_sub(i64::from(days) * SECONDS_PER_DAY)
}

fn count_by_genre(
    movie_ids: impl Iterator<Item = i32>,
    movie_genres: &HashMap<i32, i32>,
) -> HashMap<i32, u32> {
    let mut counts = HashMap::new();
    for movie_id in movie_ids {
        if let Some(genre_id) = movie_genres.get(&movie_id) {
            *counts.entry(*genre_id).or_default() += 1;
        }
    }
    counts
}

fn rank(
    genres: impl Iterator<Item = Genre>,
    counts: &HashMap<i32, u32>,
    limit: usize,
) -> Vec<TrendingGenre> {
    let mut trending: Vec<TrendingGenre> = genres
        .filter_map(|genre| {
            let rating_count = *counts.get(&genre.id)?;
            Some(TrendingGenre { genre, rating_count })
        })
        .collect();
    trending.sort_by(|a, b| {
        b.rating_count.cmp(&a.rating_count).then_with(|| a.genre.id.cmp(&b.genre.id))
    });
    trending.truncate(limit);
    trending
}
