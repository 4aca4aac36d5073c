use super::r#trait::is_skipped_component;
use super::{glob_matcher, FileSystem};
use anyhow::Result;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
    /// A file that exists but fails every read with a permission error
    Unreadable,
}

#[derive(Debug, Clone)]
struct MockEntry {
    content: Vec<u8>,
    kind: EntryKind,
}

pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            root,
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert(path.as_ref(), content.as_bytes().to_vec(), EntryKind::File);
    }

    pub fn add_bytes(&self, path: impl AsRef<Path>, content: &[u8]) {
        self.insert(path.as_ref(), content.to_vec(), EntryKind::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), Vec::new(), EntryKind::Directory);
    }

    /// Register a file that exists but cannot be read.
    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), Vec::new(), EntryKind::Unreadable);
    }

    fn insert(&self, path: &Path, content: Vec<u8>, kind: EntryKind) {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(path, MockEntry { content, kind });
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: Vec::new(),
                kind: EntryKind::Directory,
            });
        }
    }

    fn kind_of(&self, path: &Path) -> Option<EntryKind> {
        let path = self.normalize_path(path);
        self.files.read().unwrap().get(&path).map(|e| e.kind)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.kind_of(path).is_some()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files.get(&path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {:?}", path),
            )
        })?;

        match entry.kind {
            EntryKind::File => Ok(entry.content.clone()),
            EntryKind::Directory => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Is a directory: {:?}", path),
            )),
            EntryKind::Unreadable => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Permission denied: {:?}", path),
            )),
        }
    }

    fn glob(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = glob_matcher(root, pattern)?;
        let root = self.normalize_path(root);
        let files = self.files.read().unwrap();

        let mut matches: Vec<PathBuf> = files
            .iter()
            .filter(|(_, entry)| entry.kind != EntryKind::Directory)
            .filter_map(|(path, _)| path.strip_prefix(&root).ok())
            .filter(|rel| !rel.as_os_str().is_empty() && !is_skipped_component(rel))
            .filter(|rel| matcher.matched(rel, false).is_whitelist())
            .map(Path::to_path_buf)
            .collect();

        matches.sort();
        Ok(matches)
    }
}
