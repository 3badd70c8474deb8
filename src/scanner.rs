use std::io::ErrorKind;
use std::path::Path;

use crate::errors::{AppError, AppResult};

/// Subfolder that posted images are moved into.
pub const UPLOADED_DIR: &str = "uploaded";

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "png", "gif", "jpeg"];

pub fn is_image_file_name(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Lists the image files directly inside `folder` and makes sure the
/// `uploaded` subfolder exists.
///
/// Names come back in directory listing order; nothing is sorted.
pub async fn setup_directory(folder: &Path) -> AppResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .map_err(|e| AppError::directory_unreadable(folder, e))?;

    let mut images = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::directory_unreadable(folder, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| AppError::directory_unreadable(folder, e))?;
        if file_type.is_dir() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!(
                "Skipping non UTF-8 file name in {}: {:?}",
                folder.display(),
                entry.file_name()
            );
            continue;
        };

        if is_image_file_name(&file_name) {
            images.push(file_name);
        }
    }

    ensure_uploaded_dir(folder).await?;

    log::debug!("Found {} images in {}", images.len(), folder.display());
    Ok(images)
}

async fn ensure_uploaded_dir(folder: &Path) -> AppResult<()> {
    let uploaded_dir = folder.join(UPLOADED_DIR);

    match tokio::fs::create_dir(&uploaded_dir).await {
        Ok(()) => {
            log::info!("Created {}", uploaded_dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let metadata = tokio::fs::metadata(&uploaded_dir)
                .await
                .map_err(|e| AppError::archive_dir_unavailable(&uploaded_dir, e))?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(AppError::archive_dir_unavailable(
                    &uploaded_dir,
                    std::io::Error::new(ErrorKind::AlreadyExists, "exists but is not a directory"),
                ))
            }
        }
        Err(e) => Err(AppError::archive_dir_unavailable(&uploaded_dir, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_image_file_name() {
        for name in ["a.JPG", "b.png", "c.gif", "d.jpeg", "E.JpEg"] {
            assert!(is_image_file_name(name), "{} should match", name);
        }
        for name in ["e.txt", "f.bmp", "png", "archive.png.zip", ".gitkeep"] {
            assert!(!is_image_file_name(name), "{} should not match", name);
        }
    }

    #[tokio::test]
    async fn test_setup_directory_filters_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.JPG", "b.png", "c.gif", "d.jpeg", "e.txt", "f.bmp"] {
            fs::write(dir.path().join(name), b"data").unwrap();
        }
        fs::create_dir(dir.path().join("folder.png")).unwrap();

        let mut images = setup_directory(dir.path()).await.unwrap();
        images.sort();

        assert_eq!(images, vec!["a.JPG", "b.png", "c.gif", "d.jpeg"]);
        assert!(dir.path().join(UPLOADED_DIR).is_dir());
    }

    #[tokio::test]
    async fn test_setup_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.png"), b"data").unwrap();

        assert_eq!(setup_directory(dir.path()).await.unwrap(), vec!["x.png"]);
        assert_eq!(setup_directory(dir.path()).await.unwrap(), vec!["x.png"]);
    }

    #[tokio::test]
    async fn test_uploaded_file_instead_of_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.png"), b"data").unwrap();
        fs::write(dir.path().join(UPLOADED_DIR), b"not a folder").unwrap();

        let result = setup_directory(dir.path()).await;
        assert!(matches!(result, Err(AppError::ArchiveDirUnavailable { .. })));
        assert!(dir.path().join(UPLOADED_DIR).is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.png"), b"data").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.png")), b"data").unwrap();

        assert_eq!(setup_directory(dir.path()).await.unwrap(), vec!["ok.png"]);
    }

    #[tokio::test]
    async fn test_setup_directory_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = setup_directory(&missing).await;
        assert!(matches!(result, Err(AppError::DirectoryUnreadable { .. })));
        assert!(!missing.exists());
    }
}
