//! Read-only view over a project directory plus whitelisted environment overrides.
//!
//! Every path handed to an [`EvidenceView`] is relative to the project root.
//! Absolute paths and `..` segments that would climb above the root are
//! rejected lexically before the filesystem is touched.

use crate::config::EnvOverrides;
use crate::error::EvidenceError;
use crate::fs::{FileSystem, RealFileSystem};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
pub struct EvidenceView {
    root: PathBuf,
    env: EnvOverrides,
    fs: Arc<dyn FileSystem>,
}

impl EvidenceView {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(root, Arc::new(RealFileSystem::new()))
    }

    pub fn with_fs(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            env: EnvOverrides::empty(),
            fs,
        }
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env(&self) -> &EnvOverrides {
        &self.env
    }

    /// Existence check only; the file's content is never validated.
    pub fn has_file(&self, rel_path: &str) -> bool {
        match self.resolve(rel_path) {
            Ok(path) => self.fs.exists(&path),
            Err(_) => false,
        }
    }

    pub fn read_file(&self, rel_path: &str) -> Result<Vec<u8>, EvidenceError> {
        let path = self.resolve(rel_path)?;
        trace!(file = rel_path, "Reading evidence file");
        self.fs
            .read(&path)
            .map_err(|e| EvidenceError::from_io(rel_path, e))
    }

    pub fn read_to_string(&self, rel_path: &str) -> Result<String, EvidenceError> {
        let path = self.resolve(rel_path)?;
        trace!(file = rel_path, "Reading evidence file");
        self.fs
            .read_to_string(&path)
            .map_err(|e| EvidenceError::from_io(rel_path, e))
    }

    /// Like [`read_to_string`](Self::read_to_string), with absence folded into `None`.
    pub fn read_optional(&self, rel_path: &str) -> Result<Option<String>, EvidenceError> {
        match self.read_to_string(rel_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List root-relative files matching a glob, sorted. No match is an empty list.
    pub fn list_files(&self, pattern: &str) -> Result<Vec<String>, EvidenceError> {
        if pattern.split('/').any(|segment| segment == "..") {
            return Err(EvidenceError::OutsideRoot {
                path: pattern.to_string(),
            });
        }

        let matches = self
            .fs
            .glob(&self.root, pattern)
            .map_err(|e| EvidenceError::InvalidPattern {
                pattern: pattern.to_string(),
                message: format!("{:#}", e),
            })?;

        Ok(matches
            .into_iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect())
    }

    fn resolve(&self, rel_path: &str) -> Result<PathBuf, EvidenceError> {
        let outside = || EvidenceError::OutsideRoot {
            path: rel_path.to_string(),
        };

        let mut clean = PathBuf::new();
        let mut depth = 0usize;
        for component in Path::new(rel_path).components() {
            match component {
                Component::Normal(part) => {
                    clean.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(outside());
                    }
                    clean.pop();
                    depth -= 1;
                }
                Component::RootDir | Component::Prefix(_) => return Err(outside()),
            }
        }

        Ok(self.root.join(clean))
    }
}

impl std::fmt::Debug for EvidenceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceView")
            .field("root", &self.root)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}
