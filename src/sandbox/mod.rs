//! Workspace path sandbox.
//!
//! Every path handed in by a caller is untrusted. Requests flow through
//! [`normalize::reject_unsafe`] (syntax only), then [`WorkspaceRoot::resolve`]
//! (canonicalize + containment), and finally into the walker or the reader.
//! Nothing here is cached between calls: the filesystem can change under us,
//! so each operation re-resolves from scratch.

pub mod normalize;
pub mod read;
pub mod resolve;
pub mod walk;

use serde::Serialize;
use std::io;
use std::path::Path;
use thiserror::Error;

pub use resolve::WorkspaceRoot;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("invalid path: {0}")]
    InvalidPath(&'static str),
    #[error("not found")]
    NotFound,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type SandboxResult<T> = Result<T, SandboxError>;

/// One file reachable under the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Root-relative, `/`-separated.
    pub path: String,
    pub size: u64,
}

/// Lists every file under `workspace_path`.
///
/// Fails only when the root itself cannot be canonicalized; bad entries
/// below it are left out of the result.
pub fn list_files(workspace_path: &Path) -> SandboxResult<Vec<FileEntry>> {
    Ok(WorkspaceRoot::open(workspace_path)?.list_files())
}

/// Reads `rel_path` under `workspace_path` as UTF-8 text.
pub fn read_file(workspace_path: &Path, rel_path: &str) -> SandboxResult<String> {
    WorkspaceRoot::open(workspace_path)?.read_file(rel_path)
}
