use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

/// Per-request scratch files.
///
/// Every path handed out by [`ScratchSpace::path_for`] or registered with
/// [`ScratchSpace::track`] is deleted exactly once, either by an explicit
/// [`ScratchSpace::cleanup`] or when the space is dropped. Dropping covers
/// the cancelled-request case where the handler future never resumes.
#[derive(Debug)]
pub struct ScratchSpace {
    root: PathBuf,
    token: String,
    tracked: Mutex<Vec<PathBuf>>,
}

impl ScratchSpace {
    pub fn new(root: impl Into<PathBuf>, token: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            token: token.into(),
            tracked: Mutex::new(Vec::new()),
        }
    }

    /// Scratch space under `root` with a fresh request-unique token.
    pub fn for_request(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Uuid::new_v4().simple().to_string())
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `<root>/<label>-<token>.<ext>`, tracked for cleanup.
    pub fn path_for(&self, label: &str, ext: &str) -> PathBuf {
        let path = self.root.join(format!("{label}-{}.{ext}", self.token));
        self.track(&path);
        path
    }

    /// Register a path some tool chose on its own.
    pub fn track(&self, path: &Path) {
        let mut tracked = self.lock();
        if !tracked.iter().any(|p| p == path) {
            tracked.push(path.to_path_buf());
        }
    }

    pub fn tracked(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Delete every tracked path. Returns how many files were actually removed.
    pub fn cleanup(&self) -> usize {
        let paths: Vec<PathBuf> = self.lock().drain(..).collect();
        let mut removed = 0;

        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    debug!(path = %path.display(), "Removed scratch file");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to clean up scratch file");
                }
            }
        }

        removed
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.tracked.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_namespaced_by_token() {
        let a = ScratchSpace::for_request("/tmp");
        let b = ScratchSpace::for_request("/tmp");
        assert_ne!(a.path_for("thumb", "jpg"), b.path_for("thumb", "jpg"));

        let p = a.path_for("raw", "dng");
        assert_eq!(p, PathBuf::from(format!("/tmp/raw-{}.dng", a.token())));
    }

    #[test]
    fn track_deduplicates() {
        let s = ScratchSpace::new("/tmp", "abc");
        s.path_for("thumb", "jpg");
        s.track(Path::new("/tmp/thumb-abc.jpg"));
        assert_eq!(s.tracked().len(), 1);
    }

    #[test]
    fn cleanup_removes_existing_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = ScratchSpace::new(dir.path(), "req1");
        let written = s.path_for("thumb", "jpg");
        let _never_written = s.path_for("dcraw", "ppm");
        std::fs::write(&written, b"jpeg").unwrap();

        assert_eq!(s.cleanup(), 1);
        assert!(!written.exists());
        assert!(s.tracked().is_empty());
        // Second call has nothing left to do.
        assert_eq!(s.cleanup(), 0);
    }

    #[test]
    fn drop_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let s = ScratchSpace::new(dir.path(), "req2");
            let p = s.path_for("raw", "cr2");
            std::fs::write(&p, b"raw").unwrap();
            p
        };
        assert!(!path.exists());
    }
}
