#![allow(dead_code)]

use jiff::Timestamp;
use reelrank::{
    db,
    models::{NewMovie, Rating},
    store::{CatalogueView, SqlStore, UserDirectory},
};

pub async fn store() -> SqlStore {
    SqlStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
}

pub async fn genre(store: &SqlStore, name: &str) -> i32 {
    store.all_genres().await.unwrap().into_iter().find(|g| g.name == name).unwrap().id
}

pub async fn movie(store: &SqlStore, title: &str, genre_id: i32) -> i32 {
    let new = NewMovie {
        tmdb_id: None,
        title: title.to_string(),
        release_year: Some(2010),
        genre_id,
        director: Some("Someone".to_string()),
        description: None,
    };
    store.add_movie(new).await.unwrap().id()
}

pub async fn user(store: &SqlStore, username: &str) -> i32 {
    store.create_user(username).await.unwrap().id
}

pub async fn users(store: &SqlStore, count: usize) -> Vec<i32> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(store.create_user(&format!("user{i}")).await.unwrap().id);
    }
    ids
}

pub async fn rate(store: &SqlStore, user_id: i32, movie_id: i32, score: i32) -> Rating {
    store.upsert_rating_at(user_id, movie_id, score, None, Timestamp::now()).await.unwrap()
}

pub async fn review(
    store: &SqlStore,
    user_id: i32,
    movie_id: i32,
    score: i32,
    text: &str,
    days_ago: i64,
) -> Rating {
    let at = Timestamp::from_second(Timestamp::now().as_second() - days_ago * 86_400).unwrap();
    store.upsert_rating_at(user_id, movie_id, score, Some(text), at).await.unwrap()
}
