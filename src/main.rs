use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use folder_poster::config::load_config;
use folder_poster::errors::{AppError, AppResult};
use folder_poster::run_batch;
use folder_poster::uploader::{ChannelSender, DiscordClient, RunSummary};

/// Posts up to five images per configured folder to Discord channels and
/// moves them into the folder's `uploaded` subfolder.
#[derive(Parser, Debug)]
#[command(name = "folder-poster", version, about)]
struct Cli {
    /// JSON file with the bot token and the folder to channel mapping
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(summary) => {
            summary.log_summary();
            if summary.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            log::error!("{}", describe_abort(&e));
            ExitCode::FAILURE
        }
    }
}

fn describe_abort(error: &AppError) -> String {
    if error.is_fatal() {
        format!("Aborting before any folder was processed: {}", error)
    } else {
        format!("Run failed: {}", error)
    }
}

async fn run(cli: &Cli) -> AppResult<RunSummary> {
    let config = load_config(&cli.config)?;
    let client: Arc<dyn ChannelSender> = Arc::new(DiscordClient::new(&config.token)?);
    let mut rng = StdRng::from_entropy();

    run_batch(&config, client, &mut rng).await
}
