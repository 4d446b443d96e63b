//! Uploaded image storage under the configured media root.
//!
//! Stored paths are relative (`posts/<uuid>.<ext>`) so the same value works
//! as a filesystem path under `media_root` and as a URL under `/media/`.

use std::path::Path;

use uuid::Uuid;
use yatube_core::forms::CleanImage;

use crate::error::{AppError, AppResult};

/// Subdirectory of the media root that holds post images.
pub const POST_IMAGE_DIR: &str = "posts";

/// URL prefix the media root is served under.
pub const MEDIA_URL: &str = "/media";

/// Write a validated image and return its path relative to `media_root`.
pub async fn store_post_image(media_root: &Path, image: &CleanImage) -> AppResult<String> {
    let dir = media_root.join(POST_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension());
    tokio::fs::write(dir.join(&file_name), &image.bytes)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(format!("{POST_IMAGE_DIR}/{file_name}"))
}

/// Best-effort removal of a stored image. A missing file is not an error.
pub async fn remove_post_image(media_root: &Path, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(media_root.join(relative)).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %e, path = relative, "Failed to remove post image");
        }
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;

    use super::*;

    fn clean_png() -> CleanImage {
        CleanImage {
            bytes: vec![1, 2, 3, 4],
            format: ImageFormat::Png,
        }
    }

    #[tokio::test]
    async fn stores_under_posts_with_format_extension() {
        let root = tempfile::tempdir().unwrap();
        let relative = store_post_image(root.path(), &clean_png()).await.unwrap();

        assert!(relative.starts_with("posts/"));
        assert!(relative.ends_with(".png"));
        let written = tokio::fs::read(root.path().join(&relative)).await.unwrap();
        assert_eq!(written, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn two_uploads_never_collide() {
        let root = tempfile::tempdir().unwrap();
        let a = store_post_image(root.path(), &clean_png()).await.unwrap();
        let b = store_post_image(root.path(), &clean_png()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn remove_deletes_and_tolerates_missing() {
        let root = tempfile::tempdir().unwrap();
        let relative = store_post_image(root.path(), &clean_png()).await.unwrap();

        remove_post_image(root.path(), &relative).await;
        assert!(!root.path().join(&relative).exists());
        remove_post_image(root.path(), &relative).await;
    }
}
