//! MySQL-backed store.
//!
//! # Design Decisions
//! - The pool is capped at one connection: it is the single shared handle,
//!   sqlx only supplies reconnect-on-checkout and statement caching
//! - Every statement is parameterized and bounded by the query timeout
//! - Rows decode into typed structs, then JSON at the HTTP edge

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{FromRow, MySql};

use crate::config::DatabaseConfig;
use crate::resilience::timeouts::with_timeout;
use crate::store::reports::{
    ActiveUserRow, AgeGroupRow, DecadeRow, DirectorRow, DistributionRow, GenreRow,
    MovieCountryRow, QuarterRow, TopMovieRow, UserCountryRow,
};
use crate::store::{
    Connector, MovieSummary, NewMovie, NewRating, Param, Report, Result, Store, StoreError, User,
};

const LIST_MOVIES: &str = "SELECT m.id, m.title, m.genre, m.release_year, m.director, m.country, \
            m.duration, m.created_at, \
            CAST(AVG(r.rating) AS DOUBLE) AS avg_rating, \
            COUNT(r.rating) AS rating_count \
     FROM movies m \
     LEFT JOIN ratings r ON m.id = r.movie_id \
     GROUP BY m.id \
     ORDER BY avg_rating DESC, m.id";

const INSERT_MOVIE: &str = "INSERT INTO movies (title, genre, release_year, director, country, duration) \
     VALUES (?, ?, ?, ?, ?, ?)";

const INSERT_RATING: &str = "INSERT INTO ratings (movie_id, user_id, rating, comment, created_at) \
     VALUES (?, ?, ?, ?, NOW())";

const LIST_USERS: &str =
    "SELECT id, name, email, age, country, created_at FROM users ORDER BY id";

const TABLE_COUNT: &str =
    "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = DATABASE()";

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// Bind a request field with its own type; absent fields bind NULL.
fn bind_param<'q>(query: MySqlQuery<'q>, param: &'q Option<Param>) -> MySqlQuery<'q> {
    match param {
        Some(Param::Int(v)) => query.bind(*v),
        Some(Param::Float(v)) => query.bind(*v),
        Some(Param::Bool(v)) => query.bind(*v),
        Some(Param::Text(v)) => query.bind(v.as_str()),
        None => query.bind(None::<&str>),
    }
}

/// Store over a single MySQL connection.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        with_timeout(self.query_timeout, fut).await
    }

    async fn fetch_report<T>(&self, report: Report) -> Result<Vec<serde_json::Value>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Serialize + Send + Unpin,
    {
        let mut query = sqlx::query_as::<_, T>(report.sql());
        for param in report.params() {
            query = query.bind(*param);
        }

        let rows = self.timed(query.fetch_all(&self.pool)).await?;
        rows.iter()
            .map(|row| serde_json::to_value(row).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn ping(&self) -> Result<()> {
        self.timed(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    async fn table_count(&self) -> Result<usize> {
        let count: i64 = self
            .timed(sqlx::query_scalar(TABLE_COUNT).fetch_one(&self.pool))
            .await?;
        Ok(count.max(0) as usize)
    }

    async fn list_movies(&self) -> Result<Vec<MovieSummary>> {
        self.timed(sqlx::query_as::<_, MovieSummary>(LIST_MOVIES).fetch_all(&self.pool))
            .await
    }

    async fn create_movie(&self, movie: &NewMovie) -> Result<u64> {
        let query = [
            &movie.title,
            &movie.genre,
            &movie.release_year,
            &movie.director,
            &movie.country,
            &movie.duration,
        ]
        .into_iter()
        .fold(sqlx::query(INSERT_MOVIE), bind_param);

        let result = self.timed(query.execute(&self.pool)).await?;
        Ok(result.last_insert_id())
    }

    async fn create_rating(&self, rating: &NewRating) -> Result<u64> {
        let query = [
            &rating.movie_id,
            &rating.user_id,
            &rating.rating,
            &rating.comment,
        ]
        .into_iter()
        .fold(sqlx::query(INSERT_RATING), bind_param);

        let result = self.timed(query.execute(&self.pool)).await?;
        Ok(result.last_insert_id())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.timed(sqlx::query_as::<_, User>(LIST_USERS).fetch_all(&self.pool))
            .await
    }

    async fn run_report(&self, report: Report) -> Result<Vec<serde_json::Value>> {
        match report {
            Report::TopMovies => self.fetch_report::<TopMovieRow>(report).await,
            Report::TopGenres => self.fetch_report::<GenreRow>(report).await,
            Report::RatingsByCountry => self.fetch_report::<UserCountryRow>(report).await,
            Report::RatingsByAgeGroup => self.fetch_report::<AgeGroupRow>(report).await,
            Report::RatingsByQuarter => self.fetch_report::<QuarterRow>(report).await,
            Report::MoviesByCountry => self.fetch_report::<MovieCountryRow>(report).await,
            Report::MoviesByDecade => self.fetch_report::<DecadeRow>(report).await,
            Report::TopDirectors => self.fetch_report::<DirectorRow>(report).await,
            Report::MostActiveUsers => self.fetch_report::<ActiveUserRow>(report).await,
            Report::RatingDistribution => self.fetch_report::<DistributionRow>(report).await,
        }
    }
}

/// Opens [`MySqlStore`]s from [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    config: DatabaseConfig,
}

impl MySqlConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.name)
    }

    /// How long a statement may wait for the single connection; at least one
    /// full statement.
    fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(
            self.config
                .connect_timeout_secs
                .max(self.config.query_timeout_secs),
        )
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    fn target(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.config.user, self.config.host, self.config.port, self.config.name
        )
    }

    async fn connect(&self) -> Result<Arc<dyn Store>> {
        let connect_timeout = Duration::from_secs(self.config.connect_timeout_secs);
        let pool = with_timeout(
            connect_timeout,
            MySqlPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(self.acquire_timeout())
                .connect_with(self.options()),
        )
        .await?;

        let query_timeout = Duration::from_secs(self.config.query_timeout_secs);
        Ok(Arc::new(MySqlStore::new(pool, query_timeout)))
    }
}
