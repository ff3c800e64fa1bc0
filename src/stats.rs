use std::fmt;

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{RatedMovie, Review, Reviewer, TrendingGenre},
    store::{CatalogueView, RatingStore, TrendQuery, UserDirectory},
};

pub const DASHBOARD_SIZE: usize = 5;
pub const DASHBOARD_TREND_DAYS: u32 = 30;

pub fn top_rated(movies: Vec<RatedMovie>, limit: usize) -> Vec<RatedMovie> {
    let mut movies: Vec<RatedMovie> = movies.into_iter().filter(|m| m.rating_count > 0).collect();
    movies.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.rating_count.cmp(&a.rating_count))
            .then_with(|| a.id().cmp(&b.id()))
    });
    movies.truncate(limit);
    movies
}

pub fn most_reviewed(movies: Vec<RatedMovie>, limit: usize) -> Vec<RatedMovie> {
    let mut movies: Vec<RatedMovie> = movies.into_iter().filter(|m| m.review_count > 0).collect();
    movies.sort_by(|a, b| b.review_count.cmp(&a.review_count).then_with(|| a.id().cmp(&b.id())));
    movies.truncate(limit);
    movies
}

pub struct Statistics<S> {
    store: S,
}

impl<S> Statistics<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn top_rated(&self, limit: usize) -> AppResult<Vec<RatedMovie>>
    where
        S: CatalogueView,
    {
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(top_rated(self.store.all_movies().await?, limit))
    }

    pub async fn most_reviewed(&self, limit: usize) -> AppResult<Vec<RatedMovie>>
    where
        S: CatalogueView,
    {
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(most_reviewed(self.store.all_movies().await?, limit))
    }

    pub async fn trending_genres(&self, days: u32, limit: usize) -> AppResult<Vec<TrendingGenre>>
    where
        S: TrendQuery,
    {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.trending_genres(days, limit).await
    }

    pub async fn latest_reviews(&self, limit: usize) -> AppResult<Vec<Review>>
    where
        S: RatingStore,
    {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.latest_reviewed(limit).await
    }

    pub async fn top_reviewers(&self, limit: usize) -> AppResult<Vec<Reviewer>>
    where
        S: UserDirectory,
    {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.top_reviewers(limit).await
    }

    pub async fn dashboard(&self) -> AppResult<Dashboard>
    where
        S: CatalogueView + TrendQuery,
    {
        Ok(Dashboard {
            top_rated: self.top_rated(DASHBOARD_SIZE).await?,
            trending_genres: self.trending_genres(DASHBOARD_TREND_DAYS, DASHBOARD_SIZE).await?,
            most_reviewed: self.most_reviewed(DASHBOARD_SIZE).await?,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub top_rated: Vec<RatedMovie>,
    pub trending_genres: Vec<TrendingGenre>,
    pub most_reviewed: Vec<RatedMovie>,
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        let thin = "-".repeat(40);

        writeln!(f, "{rule}")?;
        writeln!(f, "{:^80}", "MOVIE STATS DASHBOARD")?;
        writeln!(f, "{rule}")?;

        writeln!(f, "\nTOP RATED MOVIES:\n{thin}")?;
        for (i, m) in self.top_rated.iter().enumerate() {
            writeln!(
                f,
                "{}. {} ({:.1}) - {} reviews",
                i + 1,
                m.movie.title,
                m.average_rating,
                m.rating_count
            )?;
        }

        writeln!(f, "\nTRENDING GENRES (last {DASHBOARD_TREND_DAYS} days):\n{thin}")?;
        for (i, g) in self.trending_genres.iter().enumerate() {
            writeln!(f, "{}. {} - {} ratings", i + 1, g.genre.name, g.rating_count)?;
        }

        writeln!(f, "\nMOST REVIEWED MOVIES:\n{thin}")?;
        for (i, m) in self.most_reviewed.iter().enumerate() {
            writeln!(f, "{}. {} - {} reviews", i + 1, m.movie.title, m.review_count)?;
        }

        write!(f, "\n{rule}")
    }
}
