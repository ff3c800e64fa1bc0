use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::{
    error::AppResult,
    models::{MAX_SCORE, RatedMovie},
    preference::GenreAffinity,
    stats,
    store::{CatalogueView, RatingStore},
};

pub const GENRE_WEIGHT: f64 = 0.7;
pub const QUALITY_WEIGHT: f64 = 0.3;

pub fn score(affinity: f64, average_rating: f64) -> f64 {
    GENRE_WEIGHT * affinity + QUALITY_WEIGHT * (average_rating / MAX_SCORE)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: RatedMovie,
    pub score: f64,
}

pub fn rank_candidates(
    movies: Vec<RatedMovie>,
    rated: &HashSet<i32>,
    affinity: &GenreAffinity,
    limit: usize,
) -> Vec<ScoredMovie> {
    let mut scored: Vec<ScoredMovie> = movies
        .into_iter()
        .filter(|m| !rated.contains(&m.id()))
        .map(|movie| {
            let score = score(affinity.get(movie.genre_id()), movie.average_rating);
            ScoredMovie { movie, score }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| a.movie.id().cmp(&b.movie.id()))
    });
    scored.truncate(limit);
    scored
}

pub struct Recommender<S> {
    store: S,
}

impl<S: CatalogueView + RatingStore> Recommender<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn recommend(&self, user_id: i32, limit: usize) -> AppResult<Vec<RatedMovie>> {
        Ok(self.recommend_scored(user_id, limit).await?.into_iter().map(|s| s.movie).collect())
    }

    pub async fn recommend_scored(&self, user_id: i32, limit: usize) -> AppResult<Vec<ScoredMovie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Ratings are read after the catalogue so a rating that lands between the
        // two reads still excludes its movie.
        let movies = self.store.all_movies().await?;
        let ratings = self.store.ratings_by_user(user_id).await?;

        if ratings.is_empty() {
            debug!(user_id, "no rating history, falling back to top rated");
            return Ok(stats::top_rated(movies, limit)
                .into_iter()
                .map(|movie| ScoredMovie { score: score(0.0, movie.average_rating), movie })
                .collect());
        }

        let genre_of: HashMap<i32, i32> = movies.iter().map(|m| (m.id(), m.genre_id())).collect();
        let affinity = GenreAffinity::from_ratings(&ratings, |id| genre_of.get(&id).copied());
        let rated: HashSet<i32> = ratings.iter().map(|r| r.movie_id).collect();

        let ranked = rank_candidates(movies, &rated, &affinity, limit);
        debug!(
            user_id,
            rated = rated.len(),
            genres = affinity.len(),
            returned = ranked.len(),
            "recommendations ranked"
        );

        Ok(ranked)
    }

    pub async fn similar_movies(&self, movie_id: i32, limit: usize) -> AppResult<Vec<RatedMovie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(target) = self.store.movie_by_id(movie_id).await? else {
            debug!(movie_id, "similar movies requested for unknown movie");
            return Ok(Vec::new());
        };

        Ok(self
            .store
            .movies_by_genre(target.genre_id())
            .await?
            .into_iter()
            .filter(|m| m.id() != movie_id)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{Movie, Rating};

    fn movie(id: i32, genre_id: i32, average_rating: f64) -> RatedMovie {
        RatedMovie {
            movie: Movie {
                id,
                tmdb_id: None,
                title: format!("Movie {id}"),
                release_year: None,
                genre_id,
                director: None,
                description: None,
            },
            genre_name: None,
            average_rating,
            rating_count: u32::from(average_rating > 0.0),
            review_count: 0,
        }
    }

    fn affinity_for(pairs: &[(i32, i32, i32)]) -> GenreAffinity {
        let ratings: Vec<Rating> = pairs
            .iter()
            .map(|&(movie_id, _, score)| Rating {
                id: movie_id,
                user_id: 1,
                movie_id,
                score,
                review_text: None,
                rated_at: Timestamp::UNIX_EPOCH,
            })
            .collect();
        let genres: HashMap<i32, i32> = pairs.iter().map(|&(m, g, _)| (m, g)).collect();
        GenreAffinity::from_ratings(&ratings, |id| genres.get(&id).copied())
    }

    #[test]
    fn favoured_genre_outranks_better_average_elsewhere() {
        // A and C are Action (1), B is Drama (2); the user gave C a 5.
        let movies = vec![movie(1, 1, 4.0), movie(2, 2, 3.0), movie(3, 1, 2.0)];
        let affinity = affinity_for(&[(3, 1, 5)]);
        let rated = HashSet::from([3]);

        let ranked = rank_candidates(movies, &rated, &affinity, 2);

        let ids: Vec<i32> = ranked.iter().map(|s| s.movie.id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!((ranked[0].score - 0.94).abs() < 1e-9);
        assert!((ranked[1].score - 0.18).abs() < 1e-9);
    }

    #[test]
    fn rated_movies_are_never_candidates() {
        let movies: Vec<RatedMovie> = (1..=6).map(|id| movie(id, 1, 5.0)).collect();
        let rated = HashSet::from([1, 2, 3]);

        let ranked = rank_candidates(movies, &rated, &affinity_for(&[(1, 1, 4)]), 10);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|s| !rated.contains(&s.movie.id())));
    }

    #[test]
    fn equal_scores_fall_back_to_lowest_id() {
        let movies = vec![movie(9, 2, 3.0), movie(4, 2, 3.0), movie(6, 2, 3.0)];

        let ranked = rank_candidates(movies, &HashSet::new(), &GenreAffinity::default(), 3);

        let ids: Vec<i32> = ranked.iter().map(|s| s.movie.id()).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        for affinity in [0.0, 0.2, 0.5, 1.0] {
            for average in [0.0, 1.0, 2.5, 5.0] {
                let s = score(affinity, average);
                assert!((0.0..=1.0).contains(&s), "score({affinity}, {average}) = {s}");
            }
        }
        assert!((score(1.0, 5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn limit_caps_result_size() {
        let movies: Vec<RatedMovie> = (1..=5).map(|id| movie(id, 1, 3.0)).collect();

        let none = HashSet::new();
        let affinity = GenreAffinity::default();

        assert_eq!(rank_candidates(movies.clone(), &none, &affinity, 2).len(), 2);
        assert!(rank_candidates(movies, &none, &affinity, 0).is_empty());
    }
}
