use super::{normalize::reject_unsafe, SandboxError, SandboxResult};
use soft_canonicalize::soft_canonicalize;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Longest single name common filesystems accept (`NAME_MAX`).
const MAX_NAME_BYTES: usize = 255;

/// A workspace directory, canonicalized once when opened.
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
    canonical: PathBuf,
}

/// Canonical path proven to sit at or under a [`WorkspaceRoot`] at the time it
/// was resolved. Only good for the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl WorkspaceRoot {
    /// The root must already exist.
    pub fn open(root: &Path) -> SandboxResult<Self> {
        let canonical = dunce::canonicalize(root)?;
        Ok(Self { canonical })
    }

    pub fn path(&self) -> &Path {
        &self.canonical
    }

    /// Resolves an untrusted relative path under this root.
    ///
    /// Missing targets are fine (the caller decides whether that is a
    /// `NotFound`), but every existing component along the way has its
    /// symlinks followed before the containment check.
    pub fn resolve(&self, raw: &str) -> SandboxResult<ResolvedPath> {
        let rel = reject_unsafe(raw)?;
        let candidate = self.canonicalize_under(Path::new(rel))?;
        if !self.contains(&candidate) {
            return Err(SandboxError::InvalidPath("path escapes workspace"));
        }
        Ok(ResolvedPath(candidate))
    }

    /// Component-wise: `/ws2` is not inside `/ws`.
    pub fn contains(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.canonical)
    }

    /// Names the OS refuses outright (NUL bytes, over-long components) can
    /// never exist, so everything from the first such name on is appended
    /// verbatim after canonicalizing the part before it.
    fn canonicalize_under(&self, rel: &Path) -> SandboxResult<PathBuf> {
        let mut parts: Vec<Component<'_>> = Vec::new();
        let mut phantom_from: Option<usize> = None;
        for component in rel.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(SandboxError::InvalidPath("absolute path not allowed"));
                }
                Component::CurDir => {}
                Component::ParentDir => match phantom_from {
                    // inside a subtree that cannot exist, `..` is purely lexical
                    Some(start) if parts.len() > start => {
                        parts.pop();
                        if parts.len() == start {
                            phantom_from = None;
                        }
                    }
                    _ => parts.push(component),
                },
                Component::Normal(name) => {
                    if phantom_from.is_none() && unrepresentable(name) {
                        phantom_from = Some(parts.len());
                    }
                    parts.push(component);
                }
            }
        }

        let split = phantom_from.unwrap_or(parts.len());
        let mut existing = self.canonical.clone();
        existing.extend(parts[..split].iter().map(|c| c.as_os_str()));
        let mut canonical = soft_canonicalize(&existing)?;
        canonical.extend(parts[split..].iter().map(|c| c.as_os_str()));
        Ok(canonical)
    }
}

fn unrepresentable(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    bytes.contains(&0) || bytes.len() > MAX_NAME_BYTES
}
