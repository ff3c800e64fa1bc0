use std::ops::RangeInclusive;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::entities::{genre, movie, rating, user};

pub const SCORE_RANGE: RangeInclusive<i32> = 1..=5;

pub const MAX_SCORE: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl From<genre::Model> for Genre {
    fn from(m: genre::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub tmdb_id: Option<i32>,
    pub title: String,
    pub release_year: Option<i32>,
    pub genre_id: i32,
    pub director: Option<String>,
    pub description: Option<String>,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            tmdb_id: m.tmdb_id,
            title: m.title,
            release_year: m.release_year,
            genre_id: m.genre_id,
            director: m.director,
            description: m.description,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub genre_name: Option<String>,
    pub average_rating: f64,
    pub rating_count: u32,
    pub review_count: u32,
}

impl RatedMovie {
    pub fn id(&self) -> i32 {
        self.movie.id
    }

    pub fn genre_id(&self) -> i32 {
        self.movie.genre_id
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewMovie {
    #[serde(default)]
    pub tmdb_id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    pub genre_id: i32,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rating {
    pub id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub score: i32,
    pub review_text: Option<String>,
    pub rated_at: Timestamp,
}

impl Rating {
    pub fn has_review(&self) -> bool {
        has_review(self.review_text.as_deref())
    }
}

impl From<rating::Model> for Rating {
    fn from(m: rating::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            movie_id: m.movie_id,
            score: m.score,
            review_text: m.review_text,
            rated_at: timestamp(m.rated_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Review {
    #[serde(flatten)]
    pub rating: Rating,
    pub username: Option<String>,
    pub movie_title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendingGenre {
    #[serde(flatten)]
    pub genre: Genre,
    pub rating_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub created_at: Timestamp,
}

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self { id: m.id, username: m.username, created_at: timestamp(m.created_at) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reviewer {
    #[serde(flatten)]
    pub user: User,
    pub rating_count: u32,
}

pub fn has_review(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.is_empty())
}

pub(crate) fn timestamp(seconds: i64) -> Timestamp {
    Timestamp::from_second(seconds).unwrap_or(Timestamp::UNIX_EPOCH)
}
