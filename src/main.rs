//! movieflix-api server entry point.

use std::process::ExitCode;

use clap::Parser;

use movieflix_api::lifecycle::{self, Args};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match lifecycle::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be up yet if the config failed to load.
            tracing::error!(error = %e, "movieflix-api failed");
            eprintln!("movieflix-api: {e}");
            ExitCode::FAILURE
        }
    }
}
