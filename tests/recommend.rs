mod common;

use std::collections::HashSet;

use async_trait::async_trait;
use reelrank::{
    error::AppResult,
    models::{Genre, RatedMovie, Rating, Review},
    recommend::Recommender,
    stats::Statistics,
    store::{CatalogueView, RatingStore, SqlStore},
};

fn ids(movies: &[RatedMovie]) -> Vec<i32> {
    movies.iter().map(RatedMovie::id).collect()
}

struct Corpus {
    store: SqlStore,
    a: i32,
    b: i32,
    c: i32,
    raters: Vec<i32>,
}

// A (Action, avg 4 over 10), B (Drama, avg 3 over 3), C (Action, avg 2 over 1).
async fn corpus() -> Corpus {
    let store = common::store().await;
    let action = common::genre(&store, "Action").await;
    let drama = common::genre(&store, "Drama").await;
    let a = common::movie(&store, "Alpha", action).await;
    let b = common::movie(&store, "Bravo", drama).await;
    let c = common::movie(&store, "Charlie", action).await;

    let raters = common::users(&store, 10).await;
    for user in &raters {
        common::rate(&store, *user, a, 4).await;
    }
    for user in &raters[..3] {
        common::rate(&store, *user, b, 3).await;
    }
    common::rate(&store, raters[0], c, 2).await;

    Corpus { store, a, b, c, raters }
}

#[tokio::test]
async fn genre_affinity_outweighs_other_genres() {
    let Corpus { store, a, b, c, .. } = corpus().await;
    let fan = common::user(&store, "fan").await;
    common::rate(&store, fan, c, 5).await;

    let recommended = Recommender::new(store.clone()).recommend(fan, 2).await.unwrap();

    assert_eq!(ids(&recommended), vec![a, b]);
}

#[tokio::test]
async fn cold_start_matches_top_rated() {
    let Corpus { store, a, b, c, .. } = corpus().await;
    let newcomer = common::user(&store, "newcomer").await;

    let recommended = Recommender::new(store.clone()).recommend(newcomer, 3).await.unwrap();
    let top = Statistics::new(store.clone()).top_rated(3).await.unwrap();

    assert_eq!(ids(&recommended), vec![a, b, c]);
    assert_eq!(recommended, top);
}

#[tokio::test]
async fn unknown_user_is_treated_as_cold_start() {
    let Corpus { store, .. } = corpus().await;

    let recommended = Recommender::new(store.clone()).recommend(9_999, 2).await.unwrap();
    let top = Statistics::new(store.clone()).top_rated(2).await.unwrap();

    assert_eq!(recommended, top);
}

#[tokio::test]
async fn rated_movies_are_excluded_and_size_is_bounded() {
    let Corpus { store, c, raters, .. } = corpus().await;
    let user = raters[0];
    let rated: HashSet<i32> =
        store.ratings_by_user(user).await.unwrap().iter().map(|r| r.movie_id).collect();
    let recommender = Recommender::new(store.clone());

    let everything = recommender.recommend(user, 10).await.unwrap();
    let one = recommender.recommend(raters[5], 1).await.unwrap();

    assert!(everything.iter().all(|m| !rated.contains(&m.id())));
    assert!(everything.is_empty(), "user {user} rated all three movies");
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].id(), c);
}

#[tokio::test]
async fn zero_limit_returns_nothing() {
    let Corpus { store, raters, .. } = corpus().await;
    let recommender = Recommender::new(store.clone());

    assert!(recommender.recommend(raters[1], 0).await.unwrap().is_empty());
    assert!(recommender.recommend(12_345, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn similar_movies_share_genre_and_skip_target() {
    let Corpus { store, a, c, .. } = corpus().await;
    let action = common::genre(&store, "Action").await;
    let d = common::movie(&store, "Delta", action).await;
    let recommender = Recommender::new(store.clone());

    let similar = recommender.similar_movies(c, 5).await.unwrap();

    assert_eq!(ids(&similar), vec![a, d]);
    assert_eq!(recommender.similar_movies(c, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn similar_movies_for_unknown_id_is_empty() {
    let Corpus { store, .. } = corpus().await;

    let similar = Recommender::new(store).similar_movies(424_242, 5).await.unwrap();

    assert!(similar.is_empty());
}

// Submits a rating for `user_id` on `movie_id` right after the catalogue is read.
struct RatesDuringCatalogueRead {
    inner: SqlStore,
    user_id: i32,
    movie_id: i32,
}

#[async_trait]
impl CatalogueView for RatesDuringCatalogueRead {
    async fn all_movies(&self) -> AppResult<Vec<RatedMovie>> {
        let movies = self.inner.all_movies().await?;
        self.inner.upsert_rating(self.user_id, self.movie_id, 5, None).await?;
        Ok(movies)
    }

    async fn movie_by_id(&self, id: i32) -> AppResult<Option<RatedMovie>> {
        self.inner.movie_by_id(id).await
    }

    async fn movies_by_genre(&self, genre_id: i32) -> AppResult<Vec<RatedMovie>> {
        self.inner.movies_by_genre(genre_id).await
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        self.inner.all_genres().await
    }

    async fn search_movies(&self, fragment: &str) -> AppResult<Vec<RatedMovie>> {
        self.inner.search_movies(fragment).await
    }
}

#[async_trait]
impl RatingStore for RatesDuringCatalogueRead {
    async fn ratings_by_user(&self, user_id: i32) -> AppResult<Vec<Rating>> {
        self.inner.ratings_by_user(user_id).await
    }

    async fn ratings_by_movie(&self, movie_id: i32) -> AppResult<Vec<Review>> {
        self.inner.ratings_by_movie(movie_id).await
    }

    async fn rating_for(&self, user_id: i32, movie_id: i32) -> AppResult<Option<Rating>> {
        self.inner.rating_for(user_id, movie_id).await
    }

    async fn upsert_rating(
        &self,
        user_id: i32,
        movie_id: i32,
        score: i32,
        review_text: Option<&str>,
    ) -> AppResult<Rating> {
        self.inner.upsert_rating(user_id, movie_id, score, review_text).await
    }

    async fn latest_reviewed(&self, limit: usize) -> AppResult<Vec<Review>> {
        self.inner.latest_reviewed(limit).await
    }
}

#[tokio::test]
async fn rating_submitted_mid_call_is_still_excluded() {
    let Corpus { store, a, b, c, .. } = corpus().await;
    let user = common::user(&store, "late").await;
    common::rate(&store, user, a, 5).await;

    let racing = RatesDuringCatalogueRead { inner: store.clone(), user_id: user, movie_id: b };
    let recommended = Recommender::new(racing).recommend(user, 10).await.unwrap();

    assert!(store.rating_for(user, b).await.unwrap().is_some());
    assert_eq!(ids(&recommended), vec![c]);
}

#[tokio::test]
async fn first_rating_submitted_mid_call_is_still_excluded() {
    let Corpus { store, b, .. } = corpus().await;
    let user = common::user(&store, "newcomer").await;

    let racing = RatesDuringCatalogueRead { inner: store.clone(), user_id: user, movie_id: b };
    let recommended = Recommender::new(racing).recommend(user, 10).await.unwrap();

    assert!(!ids(&recommended).contains(&b));
}
