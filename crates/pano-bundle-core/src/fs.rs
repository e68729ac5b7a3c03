//! Filesystem abstraction used by the bundle builder
//!
//! The builder never touches `std::fs` directly. Production code goes through
//! [`RealFileSystem`]; tests can swap in [`MockFileSystem`] and assert on what
//! was read and written without a temporary directory.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use walkdir::WalkDir;

/// Filesystem operations needed to assemble and write a bundle
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read raw bytes; module sources are never decoded
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn is_dir(&self, path: &Path) -> bool;

    /// List regular files below `dir`, sorted by path.
    /// With `recursive` unset only direct children are returned.
    fn list_files(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>>;
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        let max_depth = if recursive { usize::MAX } else { 1 };

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
        {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

/// In-memory [`FileSystem`] for tests
///
/// Directories exist implicitly once a file is added below them. Read and
/// write failures can be injected per path with [`MockFileSystem::deny_read`]
/// and [`MockFileSystem::deny_write`].
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    unreadable: Mutex<BTreeSet<PathBuf>>,
    unwritable: Mutex<BTreeSet<PathBuf>>,
    reads: Mutex<Vec<PathBuf>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn denied(set: &BTreeSet<PathBuf>, path: &Path) -> bool {
    set.iter().any(|blocked| path.starts_with(blocked))
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("permission denied: {}", path.display()),
    )
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MockFileSystem::add_file`]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        lock(&self.files).insert(path.into(), contents.into());
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        lock(&self.dirs).insert(path.into());
    }

    /// Make every read at or below `path` fail with `PermissionDenied`
    pub fn deny_read(&self, path: impl Into<PathBuf>) {
        lock(&self.unreadable).insert(path.into());
    }

    /// Make every write or directory creation at or below `path` fail
    pub fn deny_write(&self, path: impl Into<PathBuf>) {
        lock(&self.unwritable).insert(path.into());
    }

    /// Stored contents decoded lossily, for assertions on text
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.file_bytes(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn file_bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        lock(&self.files).get(path.as_ref()).cloned()
    }

    /// Every path passed to `read`, `read_to_string` or `list_files`, in call order
    pub fn reads(&self) -> Vec<PathBuf> {
        lock(&self.reads).clone()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        String::from_utf8(self.read(path)?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        lock(&self.reads).push(path.to_path_buf());

        if denied(&lock(&self.unreadable), path) {
            return Err(permission_denied(path));
        }

        lock(&self.files).get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if denied(&lock(&self.unwritable), path) {
            return Err(permission_denied(path));
        }

        lock(&self.files).insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if denied(&lock(&self.unwritable), path) {
            return Err(permission_denied(path));
        }

        lock(&self.dirs).insert(path.to_path_buf());
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        lock(&self.dirs).iter().any(|dir| dir.starts_with(path))
            || lock(&self.files)
                .keys()
                .any(|file| file != path && file.starts_with(path))
    }

    fn list_files(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        lock(&self.reads).push(dir.to_path_buf());

        if denied(&lock(&self.unreadable), dir) {
            return Err(permission_denied(dir));
        }

        Ok(lock(&self.files)
            .keys()
            .filter(|file| *file != dir && file.starts_with(dir))
            .filter(|file| recursive || file.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_lists_direct_children_only_when_not_recursive() {
        let fs = MockFileSystem::new()
            .with_file("src/shared/apis.d.ts", "a")
            .with_file("src/shared/nested/style.d.ts", "b");

        let flat = fs.list_files(Path::new("src/shared"), false).unwrap();
        assert_eq!(flat, vec![PathBuf::from("src/shared/apis.d.ts")]);

        let deep = fs.list_files(Path::new("src/shared"), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_mock_is_dir_for_implicit_parents() {
        let fs = MockFileSystem::new().with_file("src/p2ce/index.d.ts", "");

        assert!(fs.is_dir(Path::new("src")));
        assert!(fs.is_dir(Path::new("src/p2ce")));
        assert!(!fs.is_dir(Path::new("src/p2ce/index.d.ts")));
        assert!(!fs.is_dir(Path::new("src/momentum")));
    }

    #[test]
    fn test_mock_denied_read() {
        let fs = MockFileSystem::new().with_file("src/p2ce/index.d.ts", "");
        fs.deny_read("src/p2ce");

        let err = fs.list_files(Path::new("src/p2ce"), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_real_fs_sorted_and_filtered_by_depth() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.d.ts"), "b").unwrap();
        std::fs::write(dir.path().join("a.d.ts"), "a").unwrap();
        std::fs::write(dir.path().join("nested/c.d.ts"), "c").unwrap();

        let fs = RealFileSystem::new();
        let flat = fs.list_files(dir.path(), false).unwrap();
        assert_eq!(
            flat,
            vec![dir.path().join("a.d.ts"), dir.path().join("b.d.ts")]
        );

        let deep = fs.list_files(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&dir.path().join("nested/c.d.ts")));
    }
}
