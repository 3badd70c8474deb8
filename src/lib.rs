pub mod archive;
pub mod config;
pub mod errors;
pub mod scanner;
pub mod security;
pub mod uploader;

use rand::rngs::StdRng;
use std::sync::Arc;

use config::Config;
use errors::AppResult;
use uploader::{process_upload_queue, ChannelSender, RunSummary};

/// Opens the sender, posts every configured folder, then closes the sender.
///
/// Only a failure to open the session is returned as an error; folder
/// failures are collected in the summary.
pub async fn run_batch(
    config: &Config,
    sender: Arc<dyn ChannelSender>,
    rng: &mut StdRng,
) -> AppResult<RunSummary> {
    sender.open().await?;

    let summary = process_upload_queue(
        Arc::clone(&sender),
        config.folder_tasks(),
        config.max_concurrent_folders,
        rng,
    )
    .await;

    sender.close().await;
    Ok(summary)
}
