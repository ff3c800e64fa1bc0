mod catalogue;
mod ratings;
mod trends;
mod users;

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::{
    entities::{genre, movie, rating},
    error::AppResult,
    models::{Genre, RatedMovie, Rating, Review, Reviewer, TrendingGenre, User, has_review},
};

#[async_trait]
pub trait CatalogueView: Send + Sync {
    async fn all_movies(&self) -> AppResult<Vec<RatedMovie>>;

    async fn movie_by_id(&self, id: i32) -> AppResult<Option<RatedMovie>>;

    async fn movies_by_genre(&self, genre_id: i32) -> AppResult<Vec<RatedMovie>>;

    async fn all_genres(&self) -> AppResult<Vec<Genre>>;

    async fn search_movies(&self, fragment: &str) -> AppResult<Vec<RatedMovie>>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn ratings_by_user(&self, user_id: i32) -> AppResult<Vec<Rating>>;

    async fn ratings_by_movie(&self, movie_id: i32) -> AppResult<Vec<Review>>;

    async fn rating_for(&self, user_id: i32, movie_id: i32) -> AppResult<Option<Rating>>;

    // Insert-or-update keyed by (user_id, movie_id) in one statement.
    async fn upsert_rating(
        &self,
        user_id: i32,
        movie_id: i32,
        score: i32,
        review_text: Option<&str>,
    ) -> AppResult<Rating>;

    async fn latest_reviewed(&self, limit: usize) -> AppResult<Vec<Review>>;
}

#[async_trait]
pub trait TrendQuery: Send + Sync {
    async fn trending_genres(&self, days: u32, limit: usize) -> AppResult<Vec<TrendingGenre>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, username: &str) -> AppResult<User>;

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn user_by_name(&self, username: &str) -> AppResult<Option<User>>;

    async fn top_reviewers(&self, limit: usize) -> AppResult<Vec<Reviewer>>;
}

#[derive(Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Default)]
struct Tally {
    sum: i64,
    count: u32,
    reviews: u32,
}

fn enrich(
    rows: Vec<(movie::Model, Option<genre::Model>)>,
    ratings: &[rating::Model],
) -> Vec<RatedMovie> {
    let mut tallies: HashMap<i32, Tally> = HashMap::new();
    for r in ratings {
        let tally = tallies.entry(r.movie_id).or_default();
        tally.sum += i64::from(r.score);
        tally.count += 1;
        if has_review(r.review_text.as_deref()) {
            tally.reviews += 1;
        }
    }

    rows.into_iter()
        .map(|(movie, genre)| {
            let tally = tallies.remove(&movie.id).unwrap_or_default();
            let average_rating =
                if tally.count == 0 { 0.0 } else { tally.sum as f64 / f64::from(tally.count) };
            RatedMovie {
                movie: movie.into(),
                genre_name: genre.map(|g| g.name),
                average_rating,
                rating_count: tally.count,
                review_count: tally.reviews,
            }
        })
        .collect()
}

async fn ratings_of<C: ConnectionTrait>(
    conn: &C,
    movie_ids: &[i32],
) -> Result<Vec<rating::Model>, DbErr> {
    if movie_ids.is_empty() {
        return Ok(Vec::new());
    }
    rating::Entity::find()
        .filter(rating::Column::MovieId.is_in(movie_ids.iter().copied()))
        .all(conn)
        .await
}

pub(crate) fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
