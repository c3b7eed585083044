//! Image upload handling.
//!
//! Uploaded files are written under the configured upload directory with a
//! random filename and served back at `/uploads/<name>` by the static file
//! layer. Only common web image formats are accepted.

use std::path::{Path, PathBuf};

use rand::RngCore;
use thiserror::Error;

/// Maximum accepted upload size in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted file extensions, lowercased.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Errors from upload handling.
#[derive(Debug, Error)]
pub enum UploadError {
    /// File extension is not an accepted image format.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// File exceeds the size limit.
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Filesystem write failed.
    #[error("upload write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Validate and persist an uploaded file, returning its public URL path.
///
/// The original filename is used only to derive the extension; the stored
/// name is random so uploads cannot collide or be guessed.
///
/// # Errors
///
/// Returns `UnsupportedType` or `TooLarge` on validation failure, or `Io`
/// if writing fails.
pub async fn save_upload(
    upload_dir: &Path,
    original_name: &str,
    data: &[u8],
) -> Result<String, UploadError> {
    let ext = extension_of(original_name)
        .ok_or_else(|| UploadError::UnsupportedType(original_name.to_owned()))?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size: data.len(),
            limit: MAX_UPLOAD_BYTES,
        });
    }

    tokio::fs::create_dir_all(upload_dir).await?;

    let name = format!("{}.{ext}", random_stem());
    let path: PathBuf = upload_dir.join(&name);
    tokio::fs::write(&path, data).await?;

    tracing::debug!(file = %name, bytes = data.len(), "stored upload");
    Ok(format!("/uploads/{name}"))
}

/// The lowercased extension of `name`, if it is an accepted image format.
fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// A random 16-byte hex filename stem.
fn random_stem() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_whitelist() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("photo.webp").as_deref(), Some("webp"));
        assert!(extension_of("script.sh").is_none());
        assert!(extension_of("noextension").is_none());
        // only the final extension counts
        assert!(extension_of("photo.png.exe").is_none());
    }

    #[test]
    fn test_random_stem_shape() {
        let stem = random_stem();
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(stem, random_stem());
    }

    #[tokio::test]
    async fn test_save_rejects_oversized() {
        let dir = std::env::temp_dir().join("bramble-upload-test");
        let data = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let err = save_upload(&dir, "big.png", &data).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_public_path() {
        let dir = std::env::temp_dir().join("bramble-upload-test");
        let url = save_upload(&dir, "photo.png", b"not-really-a-png")
            .await
            .unwrap();
        let name = url.strip_prefix("/uploads/").unwrap();
        assert!(name.ends_with(".png"));
        let on_disk = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(on_disk, b"not-really-a-png");
        tokio::fs::remove_file(dir.join(name)).await.unwrap();
    }
}
