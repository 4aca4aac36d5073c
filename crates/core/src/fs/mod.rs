//! FileSystem abstraction for testable file operations

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{FileSystem, SKIPPED_DIRS};
pub use real::RealFileSystem;

use anyhow::{Context, Result};
use ignore::overrides::{Override, OverrideBuilder};
use std::path::Path;

/// Compile a root-anchored glob matcher shared by every `FileSystem` implementation.
pub(crate) fn glob_matcher(root: &Path, pattern: &str) -> Result<Override> {
    let anchored = if pattern.starts_with('/') {
        pattern.to_string()
    } else {
        format!("/{}", pattern)
    };

    let mut builder = OverrideBuilder::new(root);
    builder
        .add(&anchored)
        .with_context(|| format!("Invalid glob pattern {:?}", pattern))?;
    builder
        .build()
        .with_context(|| format!("Failed to compile glob pattern {:?}", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matcher_is_anchored() {
        let matcher = glob_matcher(Path::new("/repo"), "*.json").unwrap();
        assert!(matcher.matched("package.json", false).is_whitelist());
        assert!(!matcher
            .matched("packages/a/package.json", false)
            .is_whitelist());
    }

    #[test]
    fn test_glob_matcher_single_level_star() {
        let matcher = glob_matcher(Path::new("/repo"), "apps/*/package.json").unwrap();
        assert!(matcher.matched("apps/web/package.json", false).is_whitelist());
        assert!(!matcher
            .matched("apps/web/nested/package.json", false)
            .is_whitelist());
    }

    #[test]
    fn test_glob_matcher_rejects_bad_pattern() {
        assert!(glob_matcher(Path::new("/repo"), "apps/[*/package.json").is_err());
    }
}
