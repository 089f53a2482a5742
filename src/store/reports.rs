//! Analytical reports.
//!
//! Each report is one grouped SELECT plus the bind parameters it needs and
//! the row type its result set decodes into. The HTTP layer mounts one
//! `GET /api/analytics/{slug}` route per entry of [`Report::ALL`].

use serde::{Deserialize, Serialize};

/// Minimum ratings before a movie can appear in `top-movies`.
pub const TOP_MOVIES_MIN_RATINGS: i64 = 5;

/// Minimum ratings before a director can appear in `top-directors`.
pub const TOP_DIRECTORS_MIN_RATINGS: i64 = 10;

/// Row cap for the "top N" style reports.
pub const REPORT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    TopMovies,
    TopGenres,
    RatingsByCountry,
    RatingsByAgeGroup,
    RatingsByQuarter,
    MoviesByCountry,
    MoviesByDecade,
    TopDirectors,
    MostActiveUsers,
    RatingDistribution,
}

impl Report {
    pub const ALL: [Report; 10] = [
        Report::TopMovies,
        Report::TopGenres,
        Report::RatingsByCountry,
        Report::RatingsByAgeGroup,
        Report::RatingsByQuarter,
        Report::MoviesByCountry,
        Report::MoviesByDecade,
        Report::TopDirectors,
        Report::MostActiveUsers,
        Report::RatingDistribution,
    ];

    /// Path segment under `/api/analytics/`.
    pub fn slug(self) -> &'static str {
        match self {
            Report::TopMovies => "top-movies",
            Report::TopGenres => "top-genres",
            Report::RatingsByCountry => "ratings-by-country",
            Report::RatingsByAgeGroup => "ratings-by-age-group",
            Report::RatingsByQuarter => "ratings-by-quarter",
            Report::MoviesByCountry => "movies-by-country",
            Report::MoviesByDecade => "movies-by-decade",
            Report::TopDirectors => "top-directors",
            Report::MostActiveUsers => "most-active-users",
            Report::RatingDistribution => "rating-distribution",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Report> {
        Report::ALL.into_iter().find(|r| r.slug() == slug)
    }

    /// Positional bind parameters, in `?` order.
    pub fn params(self) -> &'static [i64] {
        match self {
            Report::TopMovies => &[TOP_MOVIES_MIN_RATINGS, REPORT_LIMIT],
            Report::TopDirectors => &[TOP_DIRECTORS_MIN_RATINGS, REPORT_LIMIT],
            Report::MostActiveUsers => &[REPORT_LIMIT],
            _ => &[],
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Report::TopMovies => {
                "SELECT m.id, m.title, m.genre, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating, \
                        COUNT(r.id) AS rating_count \
                 FROM movies m \
                 JOIN ratings r ON r.movie_id = m.id \
                 GROUP BY m.id, m.title, m.genre \
                 HAVING COUNT(r.id) >= ? \
                 ORDER BY avg_rating DESC, rating_count DESC, m.id \
                 LIMIT ?"
            }
            // Only the first comma-separated token counts as the genre.
            Report::TopGenres => {
                "SELECT TRIM(SUBSTRING_INDEX(m.genre, ',', 1)) AS primary_genre, \
                        COUNT(DISTINCT m.id) AS movie_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating, \
                        COUNT(r.id) AS rating_count \
                 FROM movies m \
                 LEFT JOIN ratings r ON r.movie_id = m.id \
                 GROUP BY primary_genre \
                 ORDER BY avg_rating DESC, primary_genre"
            }
            Report::RatingsByCountry => {
                "SELECT u.country, \
                        COUNT(r.id) AS rating_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating, \
                        COUNT(DISTINCT u.id) AS user_count \
                 FROM ratings r \
                 JOIN users u ON u.id = r.user_id \
                 GROUP BY u.country \
                 ORDER BY rating_count DESC, u.country"
            }
            Report::RatingsByAgeGroup => {
                "SELECT CASE \
                            WHEN u.age IS NULL OR u.age <= 0 OR u.age > 100 THEN 'Unknown' \
                            WHEN u.age <= 18 THEN '<18' \
                            WHEN u.age <= 25 THEN '18-25' \
                            WHEN u.age <= 35 THEN '26-35' \
                            WHEN u.age <= 50 THEN '36-50' \
                            ELSE '50+' \
                        END AS age_group, \
                        COUNT(r.id) AS rating_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating, \
                        COUNT(DISTINCT u.id) AS user_count \
                 FROM ratings r \
                 JOIN users u ON u.id = r.user_id \
                 GROUP BY age_group \
                 ORDER BY FIELD(age_group, '<18', '18-25', '26-35', '36-50', '50+', 'Unknown')"
            }
            Report::RatingsByQuarter => {
                "SELECT CAST(CONCAT(YEAR(r.created_at), '-Q', QUARTER(r.created_at)) AS CHAR) AS period, \
                        COUNT(r.id) AS rating_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating \
                 FROM ratings r \
                 WHERE r.created_at IS NOT NULL \
                 GROUP BY period \
                 ORDER BY period"
            }
            Report::MoviesByCountry => {
                "SELECT m.country, \
                        COUNT(DISTINCT m.id) AS movie_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating \
                 FROM movies m \
                 LEFT JOIN ratings r ON r.movie_id = m.id \
                 GROUP BY m.country \
                 ORDER BY movie_count DESC, m.country"
            }
            Report::MoviesByDecade => {
                "SELECT CAST(FLOOR(m.release_year / 10) * 10 AS SIGNED) AS decade, \
                        COUNT(DISTINCT m.id) AS movie_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating \
                 FROM movies m \
                 LEFT JOIN ratings r ON r.movie_id = m.id \
                 WHERE m.release_year IS NOT NULL \
                 GROUP BY decade \
                 ORDER BY decade"
            }
            Report::TopDirectors => {
                "SELECT m.director, \
                        COUNT(DISTINCT m.id) AS movie_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating, \
                        COUNT(r.id) AS rating_count \
                 FROM movies m \
                 JOIN ratings r ON r.movie_id = m.id \
                 WHERE m.director IS NOT NULL \
                 GROUP BY m.director \
                 HAVING COUNT(r.id) >= ? \
                 ORDER BY avg_rating DESC, m.director \
                 LIMIT ?"
            }
            Report::MostActiveUsers => {
                "SELECT u.id, u.name, u.country, \
                        COUNT(r.id) AS rating_count, \
                        CAST(AVG(r.rating) AS DOUBLE) AS avg_rating \
                 FROM users u \
                 JOIN ratings r ON r.user_id = u.id \
                 GROUP BY u.id, u.name, u.country \
                 ORDER BY rating_count DESC, u.id \
                 LIMIT ?"
            }
            Report::RatingDistribution => {
                "SELECT CAST(r.rating AS DOUBLE) AS rating, \
                        COUNT(*) AS rating_count, \
                        CAST(ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM ratings), 2) AS DOUBLE) AS percentage \
                 FROM ratings r \
                 GROUP BY r.rating \
                 ORDER BY r.rating"
            }
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopMovieRow {
    pub id: i64,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenreRow {
    pub primary_genre: Option<String>,
    pub movie_count: i64,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserCountryRow {
    pub country: Option<String>,
    pub rating_count: i64,
    pub avg_rating: Option<f64>,
    pub user_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgeGroupRow {
    pub age_group: String,
    pub rating_count: i64,
    pub avg_rating: Option<f64>,
    pub user_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuarterRow {
    /// `YYYY-Qn`.
    pub period: String,
    pub rating_count: i64,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MovieCountryRow {
    pub country: Option<String>,
    pub movie_count: i64,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DecadeRow {
    pub decade: i64,
    pub movie_count: i64,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DirectorRow {
    pub director: Option<String>,
    pub movie_count: i64,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActiveUserRow {
    pub id: i64,
    pub name: Option<String>,
    pub country: Option<String>,
    pub rating_count: i64,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DistributionRow {
    pub rating: Option<f64>,
    pub rating_count: i64,
    pub percentage: Option<f64>,
}
