//! Sandboxed path resolution.
//!
//! Every filesystem action resolves its path through [`SandboxRoot::resolve`]
//! before touching disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::{SandboxError, SandboxResult};

/// A validated, canonical project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    /// Open a sandbox rooted at an existing directory.
    pub fn new(path: impl AsRef<Path>) -> SandboxResult<Self> {
        let path = path.as_ref();
        let root = fs::canonicalize(path).map_err(|e| SandboxError::InvalidRoot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !root.is_dir() {
            return Err(SandboxError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self { root })
    }

    /// Canonical root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path to an absolute path strictly inside the root.
    ///
    /// The path is normalized lexically first, so `..` can never climb above the
    /// root. The deepest part of the result that already exists is then
    /// canonicalized and must still lie inside the root, which keeps symlinks
    /// from pointing writes elsewhere.
    pub fn resolve(&self, relative: &str) -> SandboxResult<PathBuf> {
        let resolved = self.normalize(relative)?;

        if !self.is_strictly_inside(&resolved) {
            warn!("Rejected path outside project root: {}", relative);
            return Err(SandboxError::PathEscape(relative.to_string()));
        }

        let anchor = deepest_existing(&resolved);
        let canonical = match fs::canonicalize(anchor) {
            Ok(canonical) => canonical,
            // A dangling link cannot be followed, so its target is unverifiable.
            Err(_) if is_symlink(anchor) => {
                warn!("Rejected path through a dangling link: {}", relative);
                return Err(SandboxError::PathEscape(relative.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if !canonical.starts_with(&self.root) {
            warn!("Rejected path leaving project root through a link: {}", relative);
            return Err(SandboxError::PathEscape(relative.to_string()));
        }

        Ok(resolved)
    }

    /// Project-relative, `/`-separated form of a path under the root.
    pub fn relative(&self, absolute: &Path) -> Option<String> {
        let rest = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rest
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    fn normalize(&self, relative: &str) -> SandboxResult<PathBuf> {
        if relative.trim().is_empty() {
            return Err(SandboxError::PathEscape(relative.to_string()));
        }

        let mut resolved = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                // Absolute paths and drive prefixes are never project-relative.
                Component::RootDir | Component::Prefix(_) => {
                    warn!("Rejected absolute path: {}", relative);
                    return Err(SandboxError::PathEscape(relative.to_string()));
                }
            }
        }

        Ok(resolved)
    }

    /// Component-wise containment: `/a/web-evil` is not inside `/a/web`, and
    /// the root itself is not inside the root.
    fn is_strictly_inside(&self, path: &Path) -> bool {
        path != self.root && path.starts_with(&self.root)
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

fn deepest_existing(path: &Path) -> &Path {
    let mut current = path;
    while fs::symlink_metadata(current).is_err() {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}
