// src/main.rs
mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::Args;
use ksi_stats::error::AppError;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.list_config {
        return commands::handle_list_config_command().await;
    }

    let (log_file_path, _guard) = logging::setup_logging(&args).await?;
    info!("Logs are written to {}", log_file_path);

    let outcome = if args.clear_cache {
        commands::handle_clear_cache_command().await
    } else if args.clear_expired {
        commands::handle_clear_expired_command().await
    } else {
        commands::handle_report_command(&args).await
    };

    if let Err(e) = &outcome {
        error!("{}", e);
    }
    outcome
}
