use crate::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Maps project ids onto workspace directories under one storage root.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Project ids arrive from the URL, so only canonical UUIDs name a
    /// workspace; anything else is simply an unknown project.
    pub fn locate(&self, project_id: &str) -> AppResult<PathBuf> {
        let dir = self.dir_for(project_id).ok_or(AppError::ProjectNotFound)?;
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(AppError::ProjectNotFound)
        }
    }

    /// Creates `<root>/<id>/.codex`. Safe to call again.
    pub fn create(&self, project_id: &str) -> AppResult<PathBuf> {
        let dir = self.dir_for(project_id).ok_or(AppError::ProjectNotFound)?;
        fs::create_dir_all(dir.join(".codex")).map_err(|e| AppError::Io(e.to_string()))?;
        Ok(dir)
    }

    fn dir_for(&self, project_id: &str) -> Option<PathBuf> {
        let id = Uuid::parse_str(project_id).ok()?;
        Some(self.root.join(id.hyphenated().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_locate() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(tmp.path());
        let id = Uuid::new_v4().to_string();
        assert!(matches!(store.locate(&id), Err(AppError::ProjectNotFound)));
        let dir = store.create(&id).unwrap();
        assert!(dir.join(".codex").is_dir());
        assert_eq!(store.locate(&id).unwrap(), dir);
        assert_eq!(store.create(&id).unwrap(), dir);
    }

    #[test]
    fn non_uuid_ids_never_touch_the_filesystem() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(tmp.path().join("ws"));
        fs::create_dir_all(tmp.path().join("ws")).unwrap();
        for id in ["..", "../ws", "", "abc", "/etc"] {
            assert!(matches!(store.locate(id), Err(AppError::ProjectNotFound)), "{id}");
            assert!(matches!(store.create(id), Err(AppError::ProjectNotFound)), "{id}");
        }
    }

    #[test]
    fn ids_are_normalized_to_lowercase_hyphenated() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(tmp.path());
        let id = Uuid::new_v4();
        let dir = store.create(&id.simple().to_string().to_uppercase()).unwrap();
        assert_eq!(dir, tmp.path().join(id.hyphenated().to_string()));
    }

    #[test]
    fn ensure_root_creates_nested_storage() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(tmp.path().join("a/b"));
        store.ensure_root().unwrap();
        assert!(store.root().is_dir());
    }
}
