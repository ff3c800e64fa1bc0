mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use reelrank::{AppState, routes::router, store::SqlStore};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(store: &SqlStore) -> Router {
    router(Arc::new(AppState { store: store.clone() }))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn genres_are_seeded() {
    let store = common::store().await;

    let (status, body) = call(app(&store), get("/genres")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().filter_map(|g| g["name"].as_str()).collect();
    assert!(names.contains(&"Action"));
    assert!(names.contains(&"Sci-Fi"));
}

#[tokio::test]
async fn rating_round_trip_over_http() {
    let store = common::store().await;
    let drama = common::genre(&store, "Drama").await;
    let movie = common::movie(&store, "Heat", drama).await;

    let (status, user) = call(app(&store), post("/users", json!({ "username": "ana" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["id"].as_i64().unwrap();

    let rating = json!({ "user_id": user_id, "movie_id": movie, "score": 4, "review_text": "tense" });
    let (status, body) = call(app(&store), post("/ratings", rating)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 4);

    let (status, detail) = call(app(&store), get(&format!("/movies/{movie}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Heat");
    assert_eq!(detail["rating_count"], 1);
    assert_eq!(detail["reviews"][0]["username"], "ana");
}

#[tokio::test]
async fn request_errors_map_to_status_codes() {
    let store = common::store().await;
    let drama = common::genre(&store, "Drama").await;
    let movie = common::movie(&store, "Heat", drama).await;
    let user = common::user(&store, "ana").await;

    let bad_score = json!({ "user_id": user, "movie_id": movie, "score": 9 });
    let (status, body) = call(app(&store), post("/ratings", bad_score)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("between 1 and 5"));

    let (status, _) = call(app(&store), get("/movies/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(app(&store), post("/users", json!({ "username": "ana" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn limits_default_and_clamp() {
    let store = common::store().await;
    let comedy = common::genre(&store, "Comedy").await;
    let user = common::user(&store, "ana").await;
    for i in 0..12 {
        let movie = common::movie(&store, &format!("Gag {i}"), comedy).await;
        common::rate(&store, user, movie, 3).await;
    }

    let (_, default) = call(app(&store), get("/stats/top-rated")).await;
    let (_, three) = call(app(&store), get("/stats/top-rated?limit=3")).await;
    let (_, negative) = call(app(&store), get("/stats/top-rated?limit=-2")).await;

    assert_eq!(default.as_array().unwrap().len(), 10);
    assert_eq!(three.as_array().unwrap().len(), 3);
    assert!(negative.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recommendations_and_dashboard_respond() {
    let store = common::store().await;
    let action = common::genre(&store, "Action").await;
    let movie = common::movie(&store, "Run", action).await;
    let other = common::movie(&store, "Jump", action).await;
    let user = common::user(&store, "ana").await;
    common::review(&store, user, movie, 5, "great", 1).await;

    let (status, recs) = call(app(&store), get(&format!("/users/{user}/recommendations"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recs[0]["id"], other);

    let (status, dashboard) = call(app(&store), get("/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["trending_genres"][0]["rating_count"], 1);
    assert_eq!(dashboard["most_reviewed"][0]["title"], "Run");
}

#[tokio::test]
async fn user_lookup_by_id() {
    let store = common::store().await;
    let user = common::user(&store, "ana").await;

    let (status, body) = call(app(&store), get(&format!("/users/{user}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ana");

    let (status, body) = call(app(&store), get("/users/4040")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn trend_window_days_default_and_clamp() {
    let store = common::store().await;
    let horror = common::genre(&store, "Horror").await;
    let movie = common::movie(&store, "Night", horror).await;
    let user = common::user(&store, "ana").await;
    common::review(&store, user, movie, 4, "creepy", 3).await;

    let (status, default) = call(app(&store), get("/stats/trending-genres")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(default[0]["rating_count"], 1);

    let (status, narrow) = call(app(&store), get("/stats/trending-genres?days=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(narrow.as_array().unwrap().is_empty());

    let (status, negative) = call(app(&store), get("/stats/trending-genres?days=-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(negative.as_array().unwrap().is_empty());
}
