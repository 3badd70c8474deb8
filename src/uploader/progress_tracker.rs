use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

/// Outcome of one folder task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub images_found: usize,
    pub images_processed: usize,
    /// Images left in place because the per-run quota was reached.
    pub images_deferred: usize,
    pub uploads_succeeded: usize,
    pub uploads_failed: usize,
    pub archived: Vec<PathBuf>,
    pub archive_failures: usize,
}

impl FolderReport {
    pub fn new(folder: &Path) -> Self {
        Self {
            folder: folder.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn record_upload_success(&mut self, file_name: &str, channel_id: &str) {
        self.uploads_succeeded += 1;
        log::info!(
            "Posted {} from {} to channel {}",
            file_name,
            self.folder.display(),
            channel_id
        );
    }

    pub fn record_upload_failure(&mut self, file_name: &str, channel_id: &str, error: &AppError) {
        self.uploads_failed += 1;
        log::warn!(
            "Error posting image {} to channel {}: {}",
            file_name,
            channel_id,
            error
        );
    }

    pub fn record_archived(&mut self, destination: PathBuf) {
        self.images_processed += 1;
        self.archived.push(destination);
    }

    pub fn record_archive_failure(&mut self, file_name: &str, error: &AppError) {
        self.images_processed += 1;
        self.archive_failures += 1;
        log::error!(
            "Failed to archive {} in {} (it may be posted again next run): {}",
            file_name,
            self.folder.display(),
            error
        );
    }
}

/// Per-folder results of a whole run, in launch order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub folders: Vec<(PathBuf, AppResult<FolderReport>)>,
}

impl RunSummary {
    pub fn push(&mut self, folder: PathBuf, result: AppResult<FolderReport>) {
        self.folders.push((folder, result));
    }

    pub fn has_failures(&self) -> bool {
        self.folders.iter().any(|(_, result)| result.is_err())
    }

    pub fn report_for(&self, folder: &Path) -> Option<&AppResult<FolderReport>> {
        self.folders
            .iter()
            .find(|(f, _)| f == folder)
            .map(|(_, result)| result)
    }

    pub fn images_processed(&self) -> usize {
        self.reports().map(|r| r.images_processed).sum()
    }

    pub fn uploads_failed(&self) -> usize {
        self.reports().map(|r| r.uploads_failed).sum()
    }

    fn reports(&self) -> impl Iterator<Item = &FolderReport> {
        self.folders.iter().filter_map(|(_, result)| result.as_ref().ok())
    }

    pub fn log_summary(&self) {
        for (folder, result) in &self.folders {
            if let Err(e) = result {
                log::error!("{}", describe_failure(folder, e));
            }
        }

        let failed_folders = self.folders.iter().filter(|(_, r)| r.is_err()).count();
        log::info!(
            "Run completed: {} folders ({} failed), {} images processed, \
             {} uploads succeeded, {} uploads failed, {} archive failures",
            self.folders.len(),
            failed_folders,
            self.images_processed(),
            self.reports().map(|r| r.uploads_succeeded).sum::<usize>(),
            self.uploads_failed(),
            self.reports().map(|r| r.archive_failures).sum::<usize>()
        );
    }
}

fn describe_failure(folder: &Path, error: &AppError) -> String {
    if error.is_folder_scoped() {
        format!("Folder {} skipped, its images stay in place: {}", folder.display(), error)
    } else {
        format!("Folder {} stopped unexpectedly: {}", folder.display(), error)
    }
}
