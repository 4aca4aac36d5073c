use super::r#trait::{is_skipped_component, SKIPPED_DIRS};
use super::{glob_matcher, FileSystem};
use anyhow::Result;
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn glob(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = glob_matcher(root, pattern)?;

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !SKIPPED_DIRS.contains(&name))
                    .unwrap_or(true)
            })
            .build();

        let mut matches = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry during glob");
                    continue;
                }
            };

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };

            if is_skipped_component(rel) {
                continue;
            }

            if matcher.matched(rel, false).is_whitelist() {
                matches.push(rel.to_path_buf());
            }
        }

        matches.sort();
        Ok(matches)
    }
}
