use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::archive::archive_file;
use crate::config::FolderTask;
use crate::errors::{AppError, AppResult};
use crate::scanner::setup_directory;

use super::progress_tracker::{FolderReport, RunSummary};
use super::ChannelSender;

/// Most images taken from a single folder per run
pub const MAX_IMAGES_PER_RUN: usize = 5;

/// Runs one task per folder and waits for all of them.
///
/// `max_concurrent` caps how many folders are worked on at once; `None`
/// starts every folder immediately. Each task gets its own random source
/// derived from `rng`.
pub async fn process_upload_queue(
    sender: Arc<dyn ChannelSender>,
    tasks: Vec<FolderTask>,
    max_concurrent: Option<usize>,
    rng: &mut StdRng,
) -> RunSummary {
    let limiter = max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1))));

    log::info!(
        "Processing {} folders (concurrency: {})",
        tasks.len(),
        max_concurrent.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
    );

    let mut handles = Vec::with_capacity(tasks.len());
    for task in tasks {
        let sender = Arc::clone(&sender);
        let limiter = limiter.clone();
        let mut folder_rng = StdRng::seed_from_u64(rng.gen());
        let folder = task.folder.clone();

        let handle = tokio::spawn(async move {
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };
            process_folder(sender.as_ref(), &task, &mut folder_rng).await
        });
        handles.push((folder, handle));
    }

    let mut summary = RunSummary::default();
    for (folder, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(format!(
                "task for {} did not finish: {}",
                folder.display(),
                e
            ))),
        };
        summary.push(folder, result);
    }
    summary
}

/// Scans one folder, posts up to [`MAX_IMAGES_PER_RUN`] images to every
/// channel, and archives each image once all its channels were attempted.
pub async fn process_folder<S, R>(
    sender: &S,
    task: &FolderTask,
    rng: &mut R,
) -> AppResult<FolderReport>
where
    S: ChannelSender + ?Sized,
    R: Rng,
{
    let mut report = FolderReport::new(&task.folder);

    if task.channels.is_empty() {
        // Still surface a missing folder, but leave its contents alone.
        tokio::fs::read_dir(&task.folder)
            .await
            .map_err(|e| AppError::directory_unreadable(&task.folder, e))?;
        log::warn!(
            "No channels configured for {}, skipping folder",
            task.folder.display()
        );
        return Ok(report);
    }

    let images = setup_directory(&task.folder).await?;
    report.images_found = images.len();
    report.images_deferred = images.len().saturating_sub(MAX_IMAGES_PER_RUN);

    log::info!(
        "Found {} images in {} ({} this run)",
        images.len(),
        task.folder.display(),
        images.len().min(MAX_IMAGES_PER_RUN)
    );

    for image in images.into_iter().take(MAX_IMAGES_PER_RUN) {
        let path = task.folder.join(&image);

        for channel in &task.channels {
            // Read per attempt so no handle outlives a single send.
            let contents = tokio::fs::read(&path)
                .await
                .map_err(|e| AppError::file_unreadable(&path, e))?;

            match sender.send_file(channel, &image, contents).await {
                Ok(()) => report.record_upload_success(&image, channel),
                Err(e) => report.record_upload_failure(&image, channel, &e),
            }
        }

        match archive_file(rng, &task.folder, &image).await {
            Ok(destination) => report.record_archived(destination),
            Err(e) => report.record_archive_failure(&image, &e),
        }
    }

    log::info!(
        "Finished {}: {} images processed, {} left for later",
        task.folder.display(),
        report.images_processed,
        report.images_deferred
    );
    Ok(report)
}
