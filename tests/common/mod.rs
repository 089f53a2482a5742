//! Shared utilities for integration tests: an in-memory [`Store`] and a
//! server harness on a loopback port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use movieflix_api::config::AppConfig;
use movieflix_api::connection::StoreHandle;
use movieflix_api::http::HttpServer;
use movieflix_api::lifecycle::Shutdown;
use movieflix_api::store::{
    MovieSummary, NewMovie, NewRating, Param, Report, Result, Store, StoreError, User,
};
use tokio::net::TcpListener;

/// How the fake should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Statement-level error (constraint violation, bad SQL).
    Statement,
    /// The connection is gone.
    Connection,
    /// The single connection is held by someone else.
    Busy,
}

pub const STATEMENT_ERROR: &str = "Duplicate entry 'Dune' for key 'title'";

struct Rated {
    id: u64,
    movie_id: Option<i64>,
    rating: Option<f64>,
}

/// In-memory store that mirrors the MySQL aggregation semantics closely
/// enough for handler tests.
#[derive(Default)]
pub struct FakeStore {
    movies: RwLock<Vec<MovieSummary>>,
    ratings: RwLock<Vec<Rated>>,
    users: RwLock<Vec<User>>,
    reports: RwLock<Vec<(Report, Vec<serde_json::Value>)>>,
    failure: Mutex<Option<Failure>>,
    slow_ping: AtomicBool,
}

/// How long a slow ping takes; longer than the 1 s health deadline.
pub const SLOW_PING: Duration = Duration::from_millis(1500);

/// Coerce a field the way MySQL would for an integer column.
fn as_int(param: &Option<Param>) -> Option<i64> {
    match param.as_ref()? {
        Param::Int(v) => Some(*v),
        Param::Float(v) => Some(*v as i64),
        Param::Bool(v) => Some(*v as i64),
        Param::Text(v) => v.trim().parse().ok(),
    }
}

fn as_float(param: &Option<Param>) -> Option<f64> {
    match param.as_ref()? {
        Param::Int(v) => Some(*v as f64),
        Param::Float(v) => Some(*v),
        Param::Bool(v) => Some(*v as i64 as f64),
        Param::Text(v) => v.trim().parse().ok(),
    }
}

fn as_text(param: &Option<Param>) -> Option<String> {
    param.as_ref().map(ToString::to_string)
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        *self.failure.lock().unwrap() = failure;
    }

    pub fn slow_ping(&self, slow: bool) {
        self.slow_ping.store(slow, Ordering::SeqCst);
    }

    pub fn add_user(&self, id: i64, name: &str, age: Option<i32>, country: &str) {
        self.users.write().unwrap().push(User {
            id,
            name: Some(name.to_string()),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            age,
            country: Some(country.to_string()),
            created_at: None,
        });
    }

    pub fn set_report(&self, report: Report, rows: Vec<serde_json::Value>) {
        self.reports.write().unwrap().push((report, rows));
    }

    fn check(&self) -> Result<()> {
        match *self.failure.lock().unwrap() {
            None => Ok(()),
            Some(Failure::Statement) => Err(StoreError::Other(STATEMENT_ERROR.into())),
            Some(Failure::Connection) => {
                let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
                Err(StoreError::Database(sqlx::Error::Io(io)))
            }
            Some(Failure::Busy) => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
        }
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn ping(&self) -> Result<()> {
        if self.slow_ping.load(Ordering::SeqCst) {
            tokio::time::sleep(SLOW_PING).await;
        }
        self.check()
    }

    async fn table_count(&self) -> Result<usize> {
        self.check()?;
        Ok(3)
    }

    async fn list_movies(&self) -> Result<Vec<MovieSummary>> {
        self.check()?;
        let ratings = self.ratings.read().unwrap();
        let mut movies: Vec<MovieSummary> = self
            .movies
            .read()
            .unwrap()
            .iter()
            .cloned()
            .map(|mut movie| {
                let scores: Vec<f64> = ratings
                    .iter()
                    .filter(|r| r.movie_id == Some(movie.id))
                    .filter_map(|r| r.rating)
                    .collect();
                movie.rating_count = scores.len() as i64;
                movie.avg_rating = (!scores.is_empty())
                    .then(|| scores.iter().sum::<f64>() / scores.len() as f64);
                movie
            })
            .collect();

        // avg_rating DESC with NULLs last, as MySQL orders them.
        movies.sort_by(|a, b| {
            b.avg_rating
                .partial_cmp(&a.avg_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        Ok(movies)
    }

    async fn create_movie(&self, movie: &NewMovie) -> Result<u64> {
        self.check()?;
        let mut movies = self.movies.write().unwrap();
        let id = movies.len() as i64 + 1;
        movies.push(MovieSummary {
            id,
            title: as_text(&movie.title),
            genre: as_text(&movie.genre),
            release_year: as_int(&movie.release_year).map(|v| v as i32),
            director: as_text(&movie.director),
            country: as_text(&movie.country),
            duration: as_int(&movie.duration).map(|v| v as i32),
            created_at: None,
            avg_rating: None,
            rating_count: 0,
        });
        Ok(id as u64)
    }

    async fn create_rating(&self, rating: &NewRating) -> Result<u64> {
        self.check()?;
        let mut ratings = self.ratings.write().unwrap();
        let id = ratings.len() as u64 + 1;
        ratings.push(Rated {
            id,
            movie_id: as_int(&rating.movie_id),
            rating: as_float(&rating.rating),
        });
        Ok(id)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check()?;
        Ok(self.users.read().unwrap().clone())
    }

    async fn run_report(&self, report: Report) -> Result<Vec<serde_json::Value>> {
        self.check()?;
        Ok(self
            .reports
            .read()
            .unwrap()
            .iter()
            .find(|(r, _)| *r == report)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub handle: StoreHandle,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("server unreachable")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("server unreachable")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("server unreachable")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.bind_address = "127.0.0.1:0".into();
    config.server.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/public").into();
    config.database.host = "db.internal".into();
    config.database.password = "movieflix123".into();
    config.health.timeout_secs = 1;
    config
}

/// Start a server whose handle holds `store` (or nothing).
pub async fn start_server(store: Option<Arc<FakeStore>>) -> TestServer {
    start_server_with(test_config(), store).await
}

pub async fn start_server_with(config: AppConfig, store: Option<Arc<FakeStore>>) -> TestServer {
    let handle = StoreHandle::new();
    if let Some(store) = store {
        handle.install(store);
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, handle.clone());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestServer {
        addr,
        handle,
        shutdown,
        client,
    }
}
