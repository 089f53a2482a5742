use std::process::ExitCode;

use clap::{Parser, Subcommand};
use movieflix_api::store::Report;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "movieflix-cli")]
#[command(about = "Operator CLI for the movieflix API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "MOVIEFLIX_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service and database liveness
    Health,
    /// Show the database connection the service is using
    DebugDb,
    /// List movies with their average rating
    Movies,
    /// List users
    Users,
    /// Run an analytics report (e.g. top-movies, ratings-by-age-group)
    Report { slug: String },
    /// Register a movie
    AddMovie {
        #[arg(long)]
        title: String,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        director: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Minutes
        #[arg(long)]
        duration: Option<i32>,
    },
    /// Rate a movie
    Rate {
        #[arg(long)]
        movie: i64,
        #[arg(long)]
        user: i64,
        #[arg(long)]
        rating: f64,
        #[arg(long)]
        comment: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Health => client.get(format!("{base}/health")),
        Commands::DebugDb => client.get(format!("{base}/api/debug/db")),
        Commands::Movies => client.get(format!("{base}/api/movies")),
        Commands::Users => client.get(format!("{base}/api/users")),
        Commands::Report { slug } => {
            let Some(report) = Report::from_slug(&slug) else {
                let known: Vec<&str> = Report::ALL.iter().map(|r| r.slug()).collect();
                eprintln!("Error: unknown report {slug:?}");
                eprintln!("Available: {}", known.join(", "));
                return Ok(ExitCode::FAILURE);
            };
            client.get(format!("{base}/api/analytics/{report}"))
        }
        Commands::AddMovie {
            title,
            genre,
            year,
            director,
            country,
            duration,
        } => client.post(format!("{base}/api/movies")).json(&json!({
            "title": title,
            "genre": genre,
            "release_year": year,
            "director": director,
            "country": country,
            "duration": duration,
        })),
        Commands::Rate {
            movie,
            user,
            rating,
            comment,
        } => client.post(format!("{base}/api/ratings")).json(&json!({
            "movie_id": movie,
            "user_id": user,
            "rating": rating,
            "comment": comment,
        })),
    };

    let res = request.send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        eprintln!("Response: {}", pretty(&text));
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", pretty(&text));
    Ok(ExitCode::SUCCESS)
}

fn pretty(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| text.to_string())
}
