//! File-system abstraction used by the program builder.
//!
//! Production code goes through [`RealFileSystem`]; tests inject a
//! [`MockFileSystem`] holding files in memory.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use walkdir::WalkDir;

pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> io::Result<String>;

    fn file_exists(&self, path: &Path) -> bool;

    fn directory_exists(&self, path: &Path) -> bool;

    /// Directory relative paths are resolved against
    fn current_dir(&self) -> PathBuf;

    /// Every regular file below `root`, in a stable order
    fn walk_files(&self, root: &Path) -> Vec<PathBuf>;

    /// Absolute, lexically normalized form of `path`
    fn resolve_path(&self, path: &Path) -> PathBuf {
        normalize_path(&self.current_dir(), path)
    }
}

/// Join `path` onto `base` (when relative) and fold `.`/`..` components.
/// Symlinks are not followed.
pub fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Display form used in error keys and realized file lists
pub fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn current_dir(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    }
}

/// In-memory file system for tests
#[derive(Debug)]
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, String>>,
    cwd: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_current_dir("/")
    }

    pub fn with_current_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            cwd: cwd.into(),
        }
    }

    /// Add (or replace) a file; relative paths are placed under the current dir
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = normalize_path(&self.cwd, path.as_ref());
        if let Ok(mut files) = self.files.write() {
            files.insert(path, content.into());
        }
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = normalize_path(&self.cwd, path.as_ref());
        if let Ok(mut files) = self.files.write() {
            files.remove(&path);
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        let path = normalize_path(&self.cwd, path);
        self.files
            .read()
            .ok()
            .and_then(|files| files.get(&path).cloned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("File '{}' not found.", path_to_string(&path)),
                )
            })
    }

    fn file_exists(&self, path: &Path) -> bool {
        let path = normalize_path(&self.cwd, path);
        self.files
            .read()
            .map(|files| files.contains_key(&path))
            .unwrap_or(false)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        let path = normalize_path(&self.cwd, path);
        self.files
            .read()
            .map(|files| files.keys().any(|file| file != &path && file.starts_with(&path)))
            .unwrap_or(false)
    }

    fn current_dir(&self) -> PathBuf {
        self.cwd.clone()
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        let root = normalize_path(&self.cwd, root);
        self.files
            .read()
            .map(|files| {
                files
                    .keys()
                    .filter(|file| file.starts_with(&root))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative_path() {
        let base = Path::new("/project/src");
        assert_eq!(
            normalize_path(base, Path::new("../probes/./a.ts")),
            PathBuf::from("/project/probes/a.ts")
        );
    }

    #[test]
    fn test_normalize_keeps_absolute_path() {
        let base = Path::new("/ignored");
        assert_eq!(
            normalize_path(base, Path::new("/project/a.ts")),
            PathBuf::from("/project/a.ts")
        );
    }

    #[test]
    fn test_mock_file_system_roundtrip() {
        let fs = MockFileSystem::with_current_dir("/project");
        fs.add_file("src/a.ts", "const a = 1;");

        assert!(fs.file_exists(Path::new("/project/src/a.ts")));
        assert!(fs.directory_exists(Path::new("/project/src")));
        assert_eq!(fs.read_file(Path::new("src/a.ts")).unwrap(), "const a = 1;");
        assert_eq!(fs.walk_files(Path::new("/project")).len(), 1);

        fs.remove_file("src/a.ts");
        assert!(!fs.file_exists(Path::new("src/a.ts")));
    }

    #[test]
    fn test_real_walk_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b/z.ts"), "").unwrap();
        std::fs::write(dir.path().join("a.ts"), "let a = 1;").unwrap();

        let fs = RealFileSystem::new();
        let walked: Vec<PathBuf> = fs
            .walk_files(dir.path())
            .into_iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(walked, vec![PathBuf::from("a.ts"), PathBuf::from("b/z.ts")]);
        assert_eq!(fs.read_file(&dir.path().join("a.ts")).unwrap(), "let a = 1;");
        assert!(fs.directory_exists(&dir.path().join("b")));
    }

    #[test]
    fn test_mock_missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let error = fs.read_file(Path::new("/missing.ts")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
