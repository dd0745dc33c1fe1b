use super::{FileEntry, WorkspaceRoot};
use soft_canonicalize::soft_canonicalize;
use std::fs;
use std::path::{Component, Path};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

impl WorkspaceRoot {
    /// Every regular file reachable under the root, sorted by relative path.
    ///
    /// Directory symlinks are never followed. Entries that cannot be
    /// canonicalized, that resolve outside the root, or that vanish before
    /// their size is read are dropped; directories failing the check are
    /// pruned whole.
    pub fn list_files(&self) -> Vec<FileEntry> {
        let walker = WalkDir::new(self.path())
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !entry.file_type().is_dir() || self.admits(entry.path()));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(file) = self.file_entry(&entry) {
                files.push(file);
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn admits(&self, path: &Path) -> bool {
        match soft_canonicalize(path) {
            Ok(real) if self.contains(&real) => true,
            Ok(real) => {
                debug!(path = %path.display(), real = %real.display(), "skipping entry outside workspace");
                false
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping entry that cannot be resolved");
                false
            }
        }
    }

    fn file_entry(&self, entry: &DirEntry) -> Option<FileEntry> {
        let path = entry.path();
        if !self.admits(path) {
            return None;
        }
        // follows the link, if any; vanished in the meantime means omitted
        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping entry without metadata");
                return None;
            }
        };
        if !meta.is_file() {
            return None;
        }
        let rel = relative_name(path.strip_prefix(self.path()).ok()?)?;
        Some(FileEntry { path: rel, size: meta.len() })
    }
}

/// `/`-joined; `None` for names that are not UTF-8.
fn relative_name(rel: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}
