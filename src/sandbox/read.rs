use super::{resolve::ResolvedPath, SandboxError, SandboxResult, WorkspaceRoot};
use std::fs;
use std::io::{self, Read};
use tracing::warn;

impl WorkspaceRoot {
    /// Reads a regular file under the root as UTF-8 text.
    pub fn read_file(&self, raw: &str) -> SandboxResult<String> {
        let target = self.resolve(raw).map_err(|e| {
            if let SandboxError::InvalidPath(reason) = &e {
                warn!(path = raw, reason = *reason, "rejected workspace path");
            }
            e
        })?;
        self.read_resolved(&target)
    }

    /// The resolved path is canonicalized a second time, strictly, right
    /// before it is opened; a link swapped in after `resolve` is reported as
    /// `InvalidPath`, not `NotFound`.
    pub fn read_resolved(&self, target: &ResolvedPath) -> SandboxResult<String> {
        match fs::metadata(target.as_path()) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(SandboxError::NotFound),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Err(e.into()),
            Err(_) => return Err(SandboxError::NotFound),
        }

        let real = dunce::canonicalize(target.as_path()).map_err(not_found_or_io)?;
        if !self.contains(&real) {
            warn!(path = %target.as_path().display(), real = %real.display(), "symlink escapes workspace");
            return Err(SandboxError::InvalidPath("symlink escapes workspace"));
        }

        let mut file = fs::File::open(&real).map_err(not_found_or_io)?;
        if !file.metadata()?.is_file() {
            return Err(SandboxError::NotFound);
        }
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }
}

fn not_found_or_io(e: io::Error) -> SandboxError {
    if e.kind() == io::ErrorKind::NotFound {
        SandboxError::NotFound
    } else {
        SandboxError::Io(e)
    }
}
