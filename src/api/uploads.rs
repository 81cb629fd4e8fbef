//! File upload storage under the public web root

use crate::error::Result;
use std::path::Path;

/// Strip anything but a conservative character set from a client-supplied
/// filename. Path separators in particular must not survive.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.trim_matches('-').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Write uploaded bytes into the uploads directory and return the relative
/// URL to persist. The timestamp prefix keeps repeated uploads of the same
/// filename from clobbering each other.
pub async fn save_upload(uploads_dir: &Path, original_name: &str, bytes: &[u8]) -> Result<String> {
    tokio::fs::create_dir_all(uploads_dir).await?;

    let filename = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_filename(original_name)
    );
    tokio::fs::write(uploads_dir.join(&filename), bytes).await?;

    Ok(format!("/uploads/{}", filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("logo.png"), "logo.png");
        assert_eq!(sanitize_filename("car_front-01.jpg"), "car_front-01.jpg");
    }

    #[test]
    fn test_sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "..-..-etc-passwd");
        assert_eq!(sanitize_filename("a/b\\c.png"), "a-b-c.png");
    }

    #[test]
    fn test_sanitize_empty_name_falls_back() {
        assert_eq!(sanitize_filename("///"), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[tokio::test]
    async fn test_save_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = save_upload(dir.path(), "photo.jpg", b"jpegdata")
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-photo.jpg"));

        let filename = url.strip_prefix("/uploads/").unwrap();
        let content = tokio::fs::read(dir.path().join(filename)).await.unwrap();
        assert_eq!(content, b"jpegdata");
    }
}
