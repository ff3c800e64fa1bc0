use std::{collections::HashMap, num::NonZeroU32, sync::Arc};

use anyhow::anyhow;
use futures::{StreamExt, stream};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::AppResult,
    models::{Genre, NewMovie},
    store::{CatalogueView, SqlStore},
};

const GENRE_NAMES: &[(i32, &str)] = &[
    (28, "Action"),
    (35, "Comedy"),
    (18, "Drama"),
    (27, "Horror"),
    (878, "Sci-Fi"),
    (10749, "Romance"),
    (53, "Thriller"),
];
const FALLBACK_GENRE: &str = "Drama";
const UNKNOWN_DIRECTOR: &str = "Unknown";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    Popular,
    Hindi,
}

impl Source {
    fn path(self) -> &'static str {
        match self {
            Source::Popular => "movie/popular",
            Source::Hindi => "discover/movie",
        }
    }

    fn original_language(self) -> Option<&'static str> {
        match self {
            Source::Popular => None,
            Source::Hindi => Some("hi"),
        }
    }
}

pub struct TmdbClient {
    client: wreq::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: wreq::Client, api_key: String, base_url: String, rps: u32) -> Self {
        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, limiter }
    }

    pub async fn movies_page(&self, source: Source, page: u32) -> AppResult<Vec<TmdbMovie>> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), source.path());
        let mut query = vec![("api_key", self.api_key.clone()), ("page", page.to_string())];
        if let Some(language) = source.original_language() {
            query.push(("with_original_language", language.to_string()));
        }

        debug!(?source, page, "fetching TMDB page");
        let resp: MoviePage =
            self.client.get(url).query(&query).send().await?.error_for_status()?.json().await?;
        Ok(resp.results)
    }
}

#[derive(Debug, Deserialize)]
struct MoviePage {
    results: Vec<TmdbMovie>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TmdbMovie {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GenreMap {
    by_tmdb_id: HashMap<i32, i32>,
    fallback: i32,
}

impl GenreMap {
    pub fn new(local: &[Genre]) -> AppResult<Self> {
        let by_name: HashMap<&str, i32> = local.iter().map(|g| (g.name.as_str(), g.id)).collect();
        let fallback = *by_name
            .get(FALLBACK_GENRE)
            .ok_or_else(|| anyhow!("catalogue has no {FALLBACK_GENRE} genre"))?;
        let by_tmdb_id = GENRE_NAMES
            .iter()
            .filter_map(|(tmdb_id, name)| by_name.get(name).map(|id| (*tmdb_id, *id)))
            .collect();
        Ok(Self { by_tmdb_id, fallback })
    }

    pub fn local_id(&self, tmdb_genre_ids: &[i32]) -> i32 {
        tmdb_genre_ids
            .first()
            .and_then(|id| self.by_tmdb_id.get(id))
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl TmdbMovie {
    pub fn into_new_movie(self, genres: &GenreMap) -> NewMovie {
        let release_year = self
            .release_date
            .as_deref()
            .and_then(|d| d.parse::<jiff::civil::Date>().ok())
            .map(|d| i32::from(d.year()));
        NewMovie {
            tmdb_id: Some(self.id),
            genre_id: genres.local_id(&self.genre_ids),
            title: self.title,
            release_year,
            director: Some(UNKNOWN_DIRECTOR.to_string()),
            description: self.overview.filter(|o| !o.trim().is_empty()),
        }
    }
}

pub async fn import(
    client: &TmdbClient,
    store: &SqlStore,
    source: Source,
    pages: u32,
    max_concurrent: usize,
) -> AppResult<u64> {
    let genres = GenreMap::new(&store.all_genres().await?)?;

    let mut fetched = stream::iter(1..=pages)
        .map(|page| async move { (page, client.movies_page(source, page).await) })
        .buffered(max_concurrent.max(1));

    let mut written = 0;
    while let Some((page, result)) = fetched.next().await {
        match result {
            Ok(movies) => {
                let batch: Vec<NewMovie> =
                    movies.into_iter().map(|m| m.into_new_movie(&genres)).collect();
                written += store.import_movies(&batch).await?;
                info!(?source, page, pages, written, "imported TMDB page");
            },
            Err(err) => {
                warn!(?source, page, error = %err, "failed to fetch TMDB page, skipping");
            },
        }
    }

    Ok(written)
}
