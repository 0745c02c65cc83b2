//! Promotion evaluation entry point.

use std::process::ExitCode;

use app::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    // 2. Initialize tracing
    app::init_tracing(&config);

    // 3. Evaluate and print the report
    let report = match app::run(&config).await {
        Ok(report) => report,
        Err(error) => {
            tracing::error!(%error, "evaluation failed");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "failed to render report");
            ExitCode::FAILURE
        }
    }
}
