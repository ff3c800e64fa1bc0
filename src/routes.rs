use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppResult, RequestError},
    models::{Genre, NewMovie, RatedMovie, Rating, Review, Reviewer, TrendingGenre, User},
    recommend::Recommender,
    stats::{DASHBOARD_TREND_DAYS, Dashboard, Statistics},
    store::{CatalogueView, RatingStore, UserDirectory},
};

const DEFAULT_LIMIT: i64 = 10;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/genres", get(genres))
        .route("/genres/{id}/movies", get(genre_movies))
        .route("/movies", get(search_movies).post(add_movie))
        .route("/movies/{id}", get(movie_detail))
        .route("/movies/{id}/similar", get(similar_movies))
        .route("/users", axum::routing::post(create_user))
        .route("/users/{id}", get(user_detail))
        .route("/users/{id}/ratings", get(user_ratings))
        .route("/users/{id}/recommendations", get(recommendations))
        .route("/ratings", axum::routing::post(rate_movie))
        .route("/stats/top-rated", get(top_rated))
        .route("/stats/most-reviewed", get(most_reviewed))
        .route("/stats/trending-genres", get(trending_genres))
        .route("/stats/latest-reviews", get(latest_reviews))
        .route("/stats/top-reviewers", get(top_reviewers))
        .route("/dashboard", get(dashboard))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        usize::try_from(self.limit.unwrap_or(DEFAULT_LIMIT)).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct TrendQueryParams {
    days: Option<i64>,
    limit: Option<i64>,
}

impl TrendQueryParams {
    fn days(&self) -> u32 {
        self.days.map_or(DASHBOARD_TREND_DAYS, |d| u32::try_from(d.max(0)).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    username: String,
}

#[derive(Debug, Deserialize)]
pub struct NewRating {
    user_id: i32,
    movie_id: i32,
    score: i32,
    #[serde(default)]
    review_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    movie: RatedMovie,
    reviews: Vec<Review>,
}

async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.store.all_genres().await?))
}

async fn genre_movies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<RatedMovie>>> {
    Ok(Json(state.store.movies_by_genre(id).await?))
}

async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<Vec<RatedMovie>>> {
    let movies = if q.q.trim().is_empty() {
        state.store.all_movies().await?
    } else {
        state.store.search_movies(&q.q).await?
    };
    Ok(Json(movies))
}

async fn add_movie(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<RatedMovie>)> {
    Ok((StatusCode::CREATED, Json(state.store.add_movie(new).await?)))
}

async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<MovieDetail>> {
    let movie = state.store.movie_by_id(id).await?.ok_or(RequestError::UnknownMovie(id))?;
    let reviews = state.store.ratings_by_movie(id).await?;
    Ok(Json(MovieDetail { movie, reviews }))
}

async fn similar_movies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<RatedMovie>>> {
    let recommender = Recommender::new(state.store.clone());
    Ok(Json(recommender.similar_movies(id, q.limit()).await?))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    Ok((StatusCode::CREATED, Json(state.store.create_user(&req.username).await?)))
}

async fn user_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    Ok(Json(state.store.user_by_id(id).await?.ok_or(RequestError::UnknownUser(id))?))
}

async fn user_ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.store.ratings_by_user(id).await?))
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<RatedMovie>>> {
    let recommender = Recommender::new(state.store.clone());
    Ok(Json(recommender.recommend(id, q.limit()).await?))
}

async fn rate_movie(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewRating>,
) -> AppResult<Json<Rating>> {
    let rating = state
        .store
        .upsert_rating(req.user_id, req.movie_id, req.score, req.review_text.as_deref())
        .await?;
    Ok(Json(rating))
}

async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<RatedMovie>>> {
    Ok(Json(Statistics::new(state.store.clone()).top_rated(q.limit()).await?))
}

async fn most_reviewed(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<RatedMovie>>> {
    Ok(Json(Statistics::new(state.store.clone()).most_reviewed(q.limit()).await?))
}

async fn trending_genres(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TrendQueryParams>,
) -> AppResult<Json<Vec<TrendingGenre>>> {
    let limit = LimitQuery { limit: q.limit }.limit();
    Ok(Json(Statistics::new(state.store.clone()).trending_genres(q.days(), limit).await?))
}

async fn latest_reviews(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(Statistics::new(state.store.clone()).latest_reviews(q.limit()).await?))
}

async fn top_reviewers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<Vec<Reviewer>>> {
    Ok(Json(Statistics::new(state.store.clone()).top_reviewers(q.limit()).await?))
}

async fn dashboard(State(state): State<Arc<AppState>>) -> AppResult<Json<Dashboard>> {
    Ok(Json(Statistics::new(state.store.clone()).dashboard().await?))
}
