// Uploader module - posts folder images to their channels
//
// The dispatcher only talks to the platform through `ChannelSender`, so the
// Discord client can be swapped for an in-memory one in tests.

pub mod discord_client;
pub mod progress_tracker;
pub mod upload_queue;

pub use discord_client::DiscordClient;
pub use progress_tracker::{FolderReport, RunSummary};
pub use upload_queue::{process_upload_queue, MAX_IMAGES_PER_RUN};

use async_trait::async_trait;

use crate::errors::AppResult;

#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Starts the session. Failing here aborts the run.
    async fn open(&self) -> AppResult<()>;

    async fn close(&self);

    /// Posts one file as an attachment to `channel_id`.
    async fn send_file(
        &self,
        channel_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> AppResult<()>;
}
