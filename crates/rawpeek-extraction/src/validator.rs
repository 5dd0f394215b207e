use std::path::Path;

/// A candidate is valid when it is a regular file holding at least one byte.
///
/// Tools regularly exit 0 after writing nothing (no embedded preview, codec
/// not supported), so the exit status alone is not trusted. Image structure
/// is not inspected.
pub async fn validate(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_file() && metadata.len() > 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!validate(&dir.path().join("missing.jpg")).await);
    }

    #[tokio::test]
    async fn rejects_zero_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        assert!(!validate(&path).await);
    }

    #[tokio::test]
    async fn rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!validate(dir.path()).await);
    }

    #[tokio::test]
    async fn accepts_single_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.jpg");
        std::fs::write(&path, b"\xff").unwrap();
        assert!(validate(&path).await);
    }

    #[tokio::test]
    async fn accepts_corrupt_but_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(validate(&path).await);
    }
}
