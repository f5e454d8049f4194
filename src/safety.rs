//! Workspace containment for the files generation may rewrite.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside the workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("path is in a forbidden tree: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

/// Confines rewrites to the resolved workspace.
///
/// Canonicalization resolves symlinks and `..` components, so a symlink
/// pointing outside the workspace is rejected even though it sits inside.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    root: PathBuf,
    forbidden: Vec<PathBuf>,
}

impl WorkspaceGuard {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = root.as_ref().canonicalize()?;

        // Build artifacts and VCS metadata are never generation targets,
        // and dependency sources and toolchains must stay pristine.
        let mut forbidden = Vec::new();
        for local in [root.join("target"), root.join(".git")] {
            if let Ok(canonical) = local.canonicalize() {
                forbidden.push(canonical);
            }
        }
        if let Some(home) = home::home_dir() {
            for tree in [home.join(".cargo"), home.join(".rustup")] {
                if let Ok(canonical) = tree.canonicalize() {
                    forbidden.push(canonical);
                }
            }
        }

        Ok(Self { root, forbidden })
    }

    /// Check that `path` may be rewritten, resolving it against the
    /// workspace root when relative. Returns the canonical path.
    pub fn check(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let canonical = absolute.canonicalize()?;

        if !canonical.starts_with(&self.root) {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical,
                workspace: self.root.clone(),
            });
        }
        for forbidden in &self.forbidden {
            if canonical.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical,
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(canonical)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn accepts_file_inside_workspace() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), b"").unwrap();

        let guard = WorkspaceGuard::new(dir.path()).unwrap();
        assert!(guard.check("src/lib.rs").is_ok());
    }

    #[test]
    fn rejects_file_outside_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        let outside = dir.path().join("outside.rs");
        fs::write(&outside, b"").unwrap();

        let guard = WorkspaceGuard::new(&workspace).unwrap();
        let result = guard.check(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideWorkspace { .. })));
    }

    #[test]
    fn rejects_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let generated = dir.path().join("target/debug/out.rs");
        fs::create_dir_all(generated.parent().unwrap()).unwrap();
        fs::write(&generated, b"").unwrap();

        let guard = WorkspaceGuard::new(dir.path()).unwrap();
        let result = guard.check(&generated);
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn rejects_symlink_escape() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        let outside = dir.path().join("outside.rs");
        fs::write(&outside, b"").unwrap();
        symlink(&outside, workspace.join("link.rs")).unwrap();

        let guard = WorkspaceGuard::new(&workspace).unwrap();
        let result = guard.check("link.rs");
        assert!(matches!(result, Err(SafetyError::OutsideWorkspace { .. })));
    }
}
