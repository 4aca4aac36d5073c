//! FileSystem trait definition

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};

/// Directory names never descended into when listing files.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Abstraction over read-only file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists (file or directory)
    fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of a file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read file contents as UTF-8
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// List files under `root` whose root-relative path matches `pattern`.
    ///
    /// Patterns use gitignore glob syntax anchored at `root`. Returned paths are
    /// relative to `root` and sorted.
    fn glob(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>>;
}

pub(crate) fn is_skipped_component(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| SKIPPED_DIRS.contains(&s))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_component() {
        assert!(is_skipped_component(Path::new(
            "node_modules/react/package.json"
        )));
        assert!(is_skipped_component(Path::new("apps/web/.git/HEAD")));
        assert!(!is_skipped_component(Path::new("apps/web/package.json")));
    }
}
