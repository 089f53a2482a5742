//! End-to-end tests of the HTTP surface against an in-memory store.

use reqwest::StatusCode;
use serde_json::{json, Value};

use movieflix_api::api::report_path;
use movieflix_api::health::ConnectionState;
use movieflix_api::store::Report;

mod common;
use common::{
    start_server, start_server_with, test_config, Failure, FakeStore, SLOW_PING, STATEMENT_ERROR,
};

const NOT_CONNECTED: &str = "Banco de dados não conectado";

#[tokio::test]
async fn test_every_store_endpoint_is_503_without_store() {
    let server = start_server(None).await;

    let mut gets = vec!["/api/movies".to_string(), "/api/users".to_string()];
    gets.extend(Report::ALL.into_iter().map(report_path));

    for path in &gets {
        let res = server.get(path).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE, "GET {path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], NOT_CONNECTED, "GET {path}");
    }

    for path in ["/api/movies", "/api/ratings"] {
        let res = server.post_json(path, &json!({})).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE, "POST {path}");
        let body: Value = res.json().await.unwrap();
        assert!(!body["error"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_create_movie_then_rate_and_list() {
    let store = FakeStore::new();
    let server = start_server(Some(store.clone())).await;

    let res = server
        .post_json(
            "/api/movies",
            &json!({
                "title": "Dune",
                "genre": "Sci-Fi",
                "release_year": 2021,
                "director": "Villeneuve",
                "country": "US"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["message"], "Filme cadastrado com sucesso!");
    let movie_id = created["id"].as_i64().unwrap();

    for (user_id, rating) in [(1, 5.0), (2, 4.0), (3, 5.0)] {
        let res = server
            .post_json(
                "/api/ratings",
                &json!({ "movie_id": movie_id, "user_id": user_id, "rating": rating }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["message"], "Avaliação registrada com sucesso!");
        assert!(body["id"].as_u64().unwrap() > 0);
    }

    let movies: Vec<Value> = server.get("/api/movies").await.json().await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "Dune");
    assert_eq!(movies[0]["rating_count"], 3);
    let avg = movies[0]["avg_rating"].as_f64().unwrap();
    assert!((avg - 14.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_unrated_movies_list_last_with_null_average() {
    let store = FakeStore::new();
    let server = start_server(Some(store.clone())).await;

    server.post_json("/api/movies", &json!({ "title": "Unrated" })).await;
    server.post_json("/api/movies", &json!({ "title": "Rated" })).await;
    server
        .post_json("/api/ratings", &json!({ "movie_id": 2, "user_id": 1, "rating": 3.0 }))
        .await;

    let movies: Vec<Value> = server.get("/api/movies").await.json().await.unwrap();
    assert_eq!(movies[0]["title"], "Rated");
    assert_eq!(movies[1]["title"], "Unrated");
    assert!(movies[1]["avg_rating"].is_null());
    assert_eq!(movies[1]["rating_count"], 0);
}

#[tokio::test]
async fn test_store_errors_are_redacted_by_default() {
    let store = FakeStore::new();
    store.fail_with(Some(Failure::Statement));
    let server = start_server(Some(store.clone())).await;

    let res = server.post_json("/api/movies", &json!({ "title": "Dune" })).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Erro interno do servidor");
    assert!(body.get("details").is_none());

    // Statement failures leave the connection in place.
    assert!(server.handle.is_connected());
}

#[tokio::test]
async fn test_store_errors_exposed_when_enabled() {
    let store = FakeStore::new();
    store.fail_with(Some(Failure::Statement));
    let mut config = test_config();
    config.server.expose_internal_errors = true;
    let server = start_server_with(config, Some(store.clone())).await;

    let res = server.get(&report_path(Report::TopGenres)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"], STATEMENT_ERROR);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let server = start_server(Some(FakeStore::new())).await;

    let res = server
        .client
        .post(server.url("/api/movies"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Corpo da requisição inválido");
}

#[tokio::test]
async fn test_connection_failure_clears_handle() {
    let store = FakeStore::new();
    let server = start_server(Some(store.clone())).await;
    store.fail_with(Some(Failure::Connection));

    let res = server.get("/api/users").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!server.handle.is_connected());
    assert_eq!(server.handle.state(), ConnectionState::Disconnected);

    let res = server.get("/api/users").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_busy_store_keeps_handle() {
    let store = FakeStore::new();
    let server = start_server(Some(store.clone())).await;
    store.fail_with(Some(Failure::Busy));

    let res = server.get("/api/users").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.handle.is_connected());

    store.fail_with(None);
    let res = server.get("/api/users").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_slow_health_ping_keeps_store() {
    let store = FakeStore::new();
    store.slow_ping(true);
    let server = start_server(Some(store.clone())).await;

    let started = std::time::Instant::now();
    let res = server.get("/health").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(started.elapsed() < SLOW_PING);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");

    assert!(server.handle.is_connected());
    assert_eq!(server.handle.state(), ConnectionState::Connected);
    let res = server.get("/api/movies").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_numeric_strings_are_passed_through() {
    let store = FakeStore::new();
    let server = start_server(Some(store.clone())).await;

    let res = server
        .post_json("/api/movies", &json!({ "title": "Dune", "release_year": "2021" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .post_json(
            "/api/ratings",
            &json!({ "movie_id": "1", "user_id": "7", "rating": "4.5" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let movies: Vec<Value> = server.get("/api/movies").await.json().await.unwrap();
    assert_eq!(movies[0]["release_year"], 2021);
    assert_eq!(movies[0]["avg_rating"], 4.5);
    assert_eq!(movies[0]["rating_count"], 1);
}

#[tokio::test]
async fn test_form_posts_are_accepted() {
    let store = FakeStore::new();
    let server = start_server(Some(store.clone())).await;

    let res = server
        .post_form(
            "/api/movies",
            &[("title", "Dune"), ("genre", "Sci-Fi"), ("release_year", "2021")],
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["message"], "Filme cadastrado com sucesso!");

    let res = server
        .post_form(
            "/api/ratings",
            &[("movie_id", "1"), ("user_id", "3"), ("rating", "5"), ("comment", "great")],
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let movies: Vec<Value> = server.get("/api/movies").await.json().await.unwrap();
    assert_eq!(movies[0]["title"], "Dune");
    assert_eq!(movies[0]["genre"], "Sci-Fi");
    assert_eq!(movies[0]["release_year"], 2021);
    assert_eq!(movies[0]["rating_count"], 1);
}

#[tokio::test]
async fn test_health_reports_connected_store() {
    let server = start_server(Some(FakeStore::new())).await;

    let res = server.get("/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "connected");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_health_without_store_is_503() {
    let server = start_server(None).await;

    let res = server.get("/health").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["database"], "disconnected");
    assert_eq!(body["error"], NOT_CONNECTED);
}

#[tokio::test]
async fn test_health_failed_ping_is_503_and_marks_lost() {
    let store = FakeStore::new();
    store.fail_with(Some(Failure::Connection));
    let server = start_server(Some(store)).await;

    let res = server.get("/health").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["error"], "Erro interno do servidor");
    assert!(!server.handle.is_connected());
}

#[tokio::test]
async fn test_debug_db_echoes_config_without_password() {
    let server = start_server(Some(FakeStore::new())).await;

    let res = server.get("/api/debug/db").await;
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert!(!text.contains("movieflix123"));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["connected"], true);
    assert_eq!(body["test"], json!([{ "test": 1 }]));
    assert_eq!(body["config"]["host"], "db.internal");
    assert_eq!(body["config"]["database"], "movieflix");
    assert_eq!(body["config"]["user"], "movieflix_user");
}

#[tokio::test]
async fn test_debug_db_without_store() {
    let server = start_server(None).await;

    let res = server.get("/api/debug/db").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["connected"], false);
    assert_eq!(body["error"], NOT_CONNECTED);
}

#[tokio::test]
async fn test_reports_route_by_slug() {
    let store = FakeStore::new();
    store.set_report(
        Report::RatingsByAgeGroup,
        vec![json!({ "age_group": "18-25", "rating_count": 4, "avg_rating": 4.5, "user_count": 2 })],
    );
    let server = start_server(Some(store)).await;

    let rows: Vec<Value> = server
        .get("/api/analytics/ratings-by-age-group")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["age_group"], "18-25");

    // Empty result sets are `[]`, not an error.
    let res = server.get("/api/analytics/top-directors").await;
    assert_eq!(res.status(), StatusCode::OK);
    let rows: Vec<Value> = res.json().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_repeated_gets_are_identical() {
    let store = FakeStore::new();
    store.add_user(1, "Ana", Some(30), "Brazil");
    store.add_user(2, "Bo", None, "Sweden");
    let server = start_server(Some(store)).await;

    let first = server.get("/api/users").await.text().await.unwrap();
    let second = server.get("/api/users").await.text().await.unwrap();
    assert_eq!(first, second);

    let users: Vec<Value> = serde_json::from_str(&first).unwrap();
    assert_eq!(users.len(), 2);
    assert!(users[1]["age"].is_null());
}

#[tokio::test]
async fn test_request_id_is_generated_and_echoed() {
    let server = start_server(None).await;

    let res = server.get("/api/movies").await;
    assert!(res.headers().get("x-request-id").is_some());

    let res = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test]
async fn test_landing_page_is_served() {
    let server = start_server(None).await;

    let res = server.get("/").await;
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert!(text.contains("MovieFlix"));

    let res = server.get("/no-such-page.html").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
