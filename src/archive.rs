use rand::Rng;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::scanner::UPLOADED_DIR;

const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Length of the generated base name used when an archived name is taken.
pub const RANDOM_NAME_LEN: usize = 16;

pub fn random_name<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| NAME_ALPHABET[rng.gen_range(0..NAME_ALPHABET.len())] as char)
        .collect()
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Picks the name `file_name` should have inside `uploaded_dir`: the original
/// name when it is free, otherwise a random base with the original extension.
pub async fn archive_name<R: Rng>(
    rng: &mut R,
    uploaded_dir: &Path,
    file_name: &str,
) -> String {
    if !exists(&uploaded_dir.join(file_name)).await {
        return file_name.to_string();
    }

    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    loop {
        let base = random_name(rng, RANDOM_NAME_LEN);
        let candidate = match &extension {
            Some(ext) => format!("{}.{}", base, ext),
            None => base,
        };

        if !exists(&uploaded_dir.join(&candidate)).await {
            log::info!(
                "{} already archived in {}, storing as {}",
                file_name,
                uploaded_dir.display(),
                candidate
            );
            return candidate;
        }
    }
}

/// Moves `folder/file_name` into `folder/uploaded`, returning the new path.
pub async fn archive_file<R: Rng>(
    rng: &mut R,
    folder: &Path,
    file_name: &str,
) -> AppResult<PathBuf> {
    let source = folder.join(file_name);
    let uploaded_dir = folder.join(UPLOADED_DIR);

    let target_name = archive_name(rng, &uploaded_dir, file_name).await;
    let destination = uploaded_dir.join(target_name);

    tokio::fs::rename(&source, &destination)
        .await
        .map_err(|e| AppError::archive_failed(&source, e))?;

    log::debug!("Archived {} to {}", source.display(), destination.display());
    Ok(destination)
}
