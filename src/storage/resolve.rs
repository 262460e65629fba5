//! Virtual path resolution
//!
//! Turns client-supplied virtual folder strings into absolute paths under
//! the configured root and enforces the sandbox boundary.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::ProviderError;

/// Resolves virtual folder paths against a fixed root directory.
///
/// Resolution is purely textual and never requires the target to exist;
/// containment is asserted separately by [`PathResolver::ensure_within_root`],
/// which every provider operation must call before touching the disk.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    allow_folders: bool,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, allow_folders: bool) -> Self {
        Self {
            root: root.into(),
            allow_folders,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual folder onto the root.
    ///
    /// NUL bytes and literal `..` sequences are stripped, duplicate and
    /// empty separators collapse, and the whole input is ignored when
    /// folder navigation is disabled. The result is not guaranteed to
    /// exist.
    pub fn resolve(&self, virtual_folder: &str) -> PathBuf {
        if !self.allow_folders || virtual_folder.is_empty() || virtual_folder == "/" {
            return self.root.clone();
        }

        let cleaned = virtual_folder.replace('\0', "").replace("..", "");

        let mut path = self.root.clone();
        for part in cleaned.split(['/', '\\']) {
            if part.is_empty() || part == "." {
                continue;
            }
            path.push(part);
        }
        path
    }

    /// Assert that `path`, after resolving whatever symlinks the OS would
    /// follow, still lies under the canonical root.
    ///
    /// Textual `..`-stripping alone cannot stop symlink-based escapes, so
    /// the canonical form of the deepest existing ancestor is checked
    /// against the canonical root. A mismatch is an authorization failure,
    /// never a silent clamp.
    pub fn ensure_within_root(&self, path: &Path) -> Result<(), ProviderError> {
        let canonical_root = self
            .root
            .canonicalize()
            .map_err(|_| ProviderError::OutsideRoot(self.root.display().to_string()))?;

        let canonical = canonicalize_existing_prefix(path)
            .map_err(|_| ProviderError::OutsideRoot(path.display().to_string()))?;

        if canonical.starts_with(&canonical_root) {
            Ok(())
        } else {
            Err(ProviderError::OutsideRoot(path.display().to_string()))
        }
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// non-existing tail components verbatim.
fn canonicalize_existing_prefix(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut tail: Vec<std::ffi::OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(base) => {
                let mut out = base;
                for component in tail.iter().rev() {
                    out.push(component);
                }
                return Ok(out);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        tail.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn plain_folder_joins_root() {
        let resolver = PathResolver::new("/srv/files", true);
        assert_eq!(resolver.resolve("/docs"), PathBuf::from("/srv/files/docs"));
        assert_eq!(
            resolver.resolve("docs/reports"),
            PathBuf::from("/srv/files/docs/reports")
        );
    }

    #[test]
    fn root_aliases_resolve_to_root() {
        let resolver = PathResolver::new("/srv/files", true);
        assert_eq!(resolver.resolve("/"), PathBuf::from("/srv/files"));
        assert_eq!(resolver.resolve(""), PathBuf::from("/srv/files"));
    }

    #[test]
    fn traversal_sequences_are_stripped() {
        let resolver = PathResolver::new("/srv/files", true);
        assert_eq!(resolver.resolve("../../etc"), PathBuf::from("/srv/files/etc"));
        assert_eq!(resolver.resolve("/docs/../.."), PathBuf::from("/srv/files/docs"));
        assert_eq!(resolver.resolve("..\\..\\etc"), PathBuf::from("/srv/files/etc"));
    }

    #[test]
    fn nul_bytes_and_duplicate_separators_collapse() {
        let resolver = PathResolver::new("/srv/files", true);
        assert_eq!(
            resolver.resolve("/do\0cs//reports/"),
            PathBuf::from("/srv/files/docs/reports")
        );
    }

    #[test]
    fn input_ignored_when_folders_disabled() {
        let resolver = PathResolver::new("/srv/files", false);
        assert_eq!(resolver.resolve("/docs"), PathBuf::from("/srv/files"));
        assert_eq!(resolver.resolve("../../etc"), PathBuf::from("/srv/files"));
    }

    #[test]
    fn containment_accepts_paths_under_root() {
        let dir = tempdir().unwrap();
        let resolver = PathResolver::new(dir.path(), true);
        let inside = resolver.resolve("/docs/new.txt");
        assert!(resolver.ensure_within_root(&inside).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn containment_rejects_symlink_escape() {
        let outside = tempdir().unwrap();
        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();

        let resolver = PathResolver::new(dir.path(), true);
        let path = resolver.resolve("/escape/secret.txt");
        assert!(matches!(
            resolver.ensure_within_root(&path),
            Err(ProviderError::OutsideRoot(_))
        ));
    }
}
