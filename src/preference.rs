use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::models::{MAX_SCORE, Rating};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenreAffinity {
    by_genre: HashMap<i32, f64>,
}

impl GenreAffinity {
    pub fn from_ratings(ratings: &[Rating], genre_of: impl Fn(i32) -> Option<i32>) -> Self {
        let mut sums: HashMap<i32, (i64, u32)> = HashMap::new();
        for rating in ratings {
            let Some(genre_id) = genre_of(rating.movie_id) else {
                debug!(movie_id = rating.movie_id, "rated movie not in catalogue, skipping");
                continue;
            };
            let (sum, count) = sums.entry(genre_id).or_default();
            *sum += i64::from(rating.score);
            *count += 1;
        }

        let by_genre = sums
            .into_iter()
            .map(|(genre_id, (sum, count))| (genre_id, sum as f64 / f64::from(count) / MAX_SCORE))
            .collect();

        Self { by_genre }
    }

    pub fn get(&self, genre_id: i32) -> f64 {
        self.by_genre.get(&genre_id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, genre_id: i32) -> bool {
        self.by_genre.contains_key(&genre_id)
    }

    pub fn len(&self) -> usize {
        self.by_genre.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_genre.is_empty()
    }
}
