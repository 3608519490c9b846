//! Per-request scratch directories.
//!
//! Every request gets `<root>/<uuid>/`, owned by a [`WorkspaceGuard`]. The
//! guard removes the directory when released explicitly or when dropped.
//! A drop inside a Tokio runtime hands the removal to the blocking pool, so
//! a cancelled future leaves the root clean shortly after, not instantly.

use crate::error::OcrError;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A scratch directory belonging to one request.
#[derive(Debug, Clone)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
}

impl Workspace {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The id in its hyphenated string form, as reported in `upload_id`.
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Remove a workspace directory. Missing directories are fine; other
/// failures are logged and swallowed.
fn remove_dir_tolerant(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!("Removed workspace {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove workspace {}: {}", path.display(), e),
    }
}

/// Owner of one [`Workspace`]. Dereferences to it.
#[derive(Debug)]
pub struct WorkspaceGuard {
    workspace: Workspace,
    released: bool,
}

impl WorkspaceGuard {
    /// Remove the directory now, off the async worker threads.
    pub async fn release(mut self) {
        self.released = true;
        let path = self.workspace.path.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || remove_dir_tolerant(&path)).await {
            warn!("Workspace cleanup task failed: {}", e);
        }
    }
}

impl Deref for WorkspaceGuard {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        &self.workspace
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Inside a runtime, keep the removal off the worker thread.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let path = self.workspace.path.clone();
                handle.spawn_blocking(move || remove_dir_tolerant(&path));
            }
            Err(_) => remove_dir_tolerant(&self.workspace.path),
        }
    }
}

/// Allocates and releases workspaces under one root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh, empty workspace.
    pub fn allocate(&self) -> Result<WorkspaceGuard, OcrError> {
        std::fs::create_dir_all(&self.root).map_err(|source| OcrError::WorkspaceUnavailable {
            path: self.root.clone(),
            source,
        })?;

        let id = Uuid::new_v4();
        let path = self.root.join(id.to_string());
        std::fs::create_dir(&path).map_err(|source| OcrError::WorkspaceUnavailable {
            path: path.clone(),
            source,
        })?;
        debug!("Allocated workspace {}", path.display());

        Ok(WorkspaceGuard {
            workspace: Workspace { id, path },
            released: false,
        })
    }

    /// Delete the workspace named `id`. Never fails; unknown or malformed ids
    /// are ignored.
    pub fn release(&self, id: &str) {
        match Uuid::parse_str(id.trim()) {
            Ok(uuid) => remove_dir_tolerant(&self.root.join(uuid.to_string())),
            Err(_) => warn!("Ignoring release of malformed workspace id '{}'", id),
        }
    }

    /// Whether a workspace directory with this id currently exists.
    pub fn exists(&self, id: &str) -> bool {
        Uuid::parse_str(id.trim())
            .map(|uuid| self.root.join(uuid.to_string()).is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_creates_root_and_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = WorkspaceManager::new(tmp.path().join("nested/root"));
        let ws = mgr.allocate().unwrap();
        assert!(ws.path().is_dir());
        assert!(ws.path().starts_with(mgr.root()));
        assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);
        assert!(mgr.exists(&ws.id_string()));
    }

    #[test]
    fn ids_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = WorkspaceManager::new(tmp.path());
        let a = mgr.allocate().unwrap();
        let b = mgr.allocate().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn drop_removes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = WorkspaceManager::new(tmp.path());
        let path = {
            let ws = mgr.allocate().unwrap();
            std::fs::write(ws.file("page_1.png"), b"x").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn drop_inside_runtime_removes_directory_in_background() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = WorkspaceManager::new(tmp.path());
        let ws = mgr.allocate().unwrap();
        std::fs::write(ws.file("page_1.png"), b"x").unwrap();
        let path = ws.path().to_path_buf();
        drop(ws);

        for _ in 0..100 {
            if !path.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn explicit_release_then_manager_release_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = WorkspaceManager::new(tmp.path());
        let ws = mgr.allocate().unwrap();
        let id = ws.id_string();
        ws.release().await;
        assert!(!mgr.exists(&id));
        mgr.release(&id);
        mgr.release(&id);
        assert!(!mgr.exists(&id));
    }

    #[test]
    fn release_ignores_traversal_attempts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        let sibling = tmp.path().join("keep");
        std::fs::create_dir_all(&sibling).unwrap();
        let mgr = WorkspaceManager::new(&root);
        mgr.release("../keep");
        mgr.release("");
        assert!(sibling.is_dir());
    }

    #[test]
    fn allocate_reports_unavailable_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();
        let mgr = WorkspaceManager::new(&file);
        let err = mgr.allocate().unwrap_err();
        assert!(matches!(err, OcrError::WorkspaceUnavailable { .. }));
    }
}
