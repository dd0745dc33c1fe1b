use super::{SandboxError, SandboxResult};

/// Rejects raw path strings that are absolute on any platform.
///
/// Purely syntactic: runs before anything touches the filesystem. Strings
/// that pass are returned unchanged.
pub fn reject_unsafe(raw: &str) -> SandboxResult<&str> {
    if raw.starts_with('/') || raw.starts_with('\\') {
        // also covers UNC (`\\server\share`)
        return Err(SandboxError::InvalidPath("absolute path not allowed"));
    }
    if is_drive_path(raw) {
        return Err(SandboxError::InvalidPath("absolute or drive path not allowed"));
    }
    Ok(raw)
}

/// `C:\...` or `C:/...`
fn is_drive_path(raw: &str) -> bool {
    let b = raw.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && (b[2] == b'/' || b[2] == b'\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rejected(raw: &str) -> bool {
        matches!(reject_unsafe(raw), Err(SandboxError::InvalidPath(_)))
    }

    #[test]
    fn absolute_and_platform_prefixes_rejected() {
        assert!(rejected("/etc/passwd"));
        assert!(rejected("\\Windows\\system32"));
        assert!(rejected("C:\\Windows\\system32\\drivers\\etc\\hosts"));
        assert!(rejected("C:/Windows/system32/"));
        assert!(rejected("z:/x"));
        assert!(rejected("\\\\server\\share\\file"));
    }

    #[test]
    fn relative_paths_pass_through_unchanged() {
        for raw in ["index.html", ".codex/result.json", "../outside.txt", "a:b", "C:", "C:file"] {
            assert_eq!(reject_unsafe(raw).unwrap(), raw);
        }
    }

    proptest! {
        #[test]
        fn leading_separator_always_rejected(rest in ".*", sep in prop::sample::select(vec!['/', '\\'])) {
            let raw = format!("{sep}{rest}");
            prop_assert!(rejected(&raw));
        }

        #[test]
        fn drive_letter_always_rejected(letter in "[a-zA-Z]", sep in prop::sample::select(vec!['/', '\\']), rest in ".*") {
            let raw = format!("{letter}:{sep}{rest}");
            prop_assert!(rejected(&raw));
        }

        #[test]
        fn plain_names_never_rejected(name in "[a-zA-Z0-9_.-][a-zA-Z0-9_./-]{0,30}") {
            prop_assume!(!is_drive_path(&name));
            prop_assert_eq!(reject_unsafe(&name).unwrap(), name.as_str());
        }
    }
}
