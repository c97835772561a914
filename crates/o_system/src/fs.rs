//! Virtual File System abstraction.
//!
//! Provides async file operations through the [`Vfs`] trait so the runtime's
//! persistence code (tick logs, space logs, stdout logs, wake/listen/read/
//! incoming records, published output) can be exercised against a sandboxed
//! implementation in tests without touching the real filesystem.
//!
//! Trimmed from `logicaffeine-system`'s WASM/OPFS/io_uring-capable `Vfs`
//! down to the single native `tokio::fs`-backed implementation this
//! runtime needs; see `DESIGN.md` for the full list of dropped
//! dependencies.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for VFS operations.
#[derive(Debug)]
pub enum VfsError {
    NotFound(String),
    PermissionDenied(String),
    AlreadyExists(String),
    IoError(io::Error),
    InvalidPath(String),
}

impl std::fmt::Display for VfsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VfsError::NotFound(s) => write!(f, "not found: {s}"),
            VfsError::PermissionDenied(s) => write!(f, "permission denied: {s}"),
            VfsError::AlreadyExists(s) => write!(f, "already exists: {s}"),
            VfsError::IoError(e) => write!(f, "IO error: {e}"),
            VfsError::InvalidPath(s) => write!(f, "invalid path: {s}"),
        }
    }
}

impl std::error::Error for VfsError {}

impl From<io::Error> for VfsError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => VfsError::NotFound(e.to_string()),
            io::ErrorKind::PermissionDenied => VfsError::PermissionDenied(e.to_string()),
            io::ErrorKind::AlreadyExists => VfsError::AlreadyExists(e.to_string()),
            _ => VfsError::IoError(e),
        }
    }
}

pub type VfsResult<T> = Result<T, VfsError>;

/// A directory entry returned by `list_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Platform-agnostic async file operations, sandboxed to a base directory.
#[async_trait]
pub trait Vfs: Send + Sync {
    async fn read(&self, path: &str) -> VfsResult<Vec<u8>>;
    async fn read_to_string(&self, path: &str) -> VfsResult<String>;
    /// Write bytes to a file, replacing its contents (atomic on native via
    /// write-to-temp then rename).
    async fn write(&self, path: &str, contents: &[u8]) -> VfsResult<()>;
    /// Append bytes to a file, creating it if absent.
    async fn append(&self, path: &str, contents: &[u8]) -> VfsResult<()>;
    async fn exists(&self, path: &str) -> VfsResult<bool>;
    async fn create_dir_all(&self, path: &str) -> VfsResult<()>;
    async fn list_dir(&self, path: &str) -> VfsResult<Vec<DirEntry>>;
}

/// `Vfs` implementation backed by `tokio::fs`, sandboxed to `base_dir`: every
/// path is resolved relative to it, and paths that would escape it (via
/// `../` components or an absolute form) are rejected rather than resolved.
pub struct NativeVfs {
    base_dir: PathBuf,
}

impl NativeVfs {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolves `path` against the sandbox root, rejecting absolute paths
    /// and any path whose lexical normalization escapes the root. This is
    /// the same traversal guard `publish` relies on (`spec.md` §4.3/§8).
    pub fn resolve(&self, path: &str) -> VfsResult<PathBuf> {
        if path.is_empty() {
            return Err(VfsError::InvalidPath("empty path".to_string()));
        }
        if Path::new(path).is_absolute() {
            return Err(VfsError::InvalidPath(format!("absolute path rejected: {path}")));
        }
        let mut normalized = PathBuf::new();
        for component in Path::new(path).components() {
            use std::path::Component;
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(VfsError::InvalidPath(format!(
                        "path traversal rejected: {path}"
                    )))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(VfsError::InvalidPath(format!("absolute path rejected: {path}")))
                }
            }
        }
        Ok(self.base_dir.join(normalized))
    }
}

#[async_trait]
impl Vfs for NativeVfs {
    async fn read(&self, path: &str) -> VfsResult<Vec<u8>> {
        let full_path = self.resolve(path)?;
        Ok(tokio::fs::read(&full_path).await?)
    }

    async fn read_to_string(&self, path: &str) -> VfsResult<String> {
        let full_path = self.resolve(path)?;
        Ok(tokio::fs::read_to_string(&full_path).await?)
    }

    async fn write(&self, path: &str, contents: &[u8]) -> VfsResult<()> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp_path = full_path.with_extension("tmp");
        tokio::fs::write(&temp_path, contents).await?;
        tokio::fs::rename(&temp_path, &full_path).await?;
        Ok(())
    }

    async fn append(&self, path: &str, contents: &[u8]) -> VfsResult<()> {
        use tokio::io::AsyncWriteExt;

        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full_path)
            .await?;
        file.write_all(contents).await?;
        file.flush().await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> VfsResult<bool> {
        let full_path = self.resolve(path)?;
        Ok(full_path.exists())
    }

    async fn create_dir_all(&self, path: &str) -> VfsResult<()> {
        let full_path = self.resolve(path)?;
        Ok(tokio::fs::create_dir_all(&full_path).await?)
    }

    async fn list_dir(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
        let full_path = self.resolve(path)?;
        let mut entries = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&full_path).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = read_dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory: metadata.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = NativeVfs::new(dir.path());
        vfs.write("a/b.txt", b"hello").await.unwrap();
        let read_back = vfs.read_to_string("a/b.txt").await.unwrap();
        assert_eq!(read_back, "hello");
    }

    #[tokio::test]
    async fn append_creates_file_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = NativeVfs::new(dir.path());
        vfs.append("log.jsonl", b"line1\n").await.unwrap();
        vfs.append("log.jsonl", b"line2\n").await.unwrap();
        let contents = vfs.read_to_string("log.jsonl").await.unwrap();
        assert_eq!(contents, "line1\nline2\n");
    }

    #[tokio::test]
    async fn traversal_outside_base_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = NativeVfs::new(dir.path());
        let result = vfs.write("../escape.txt", b"pwned").await;
        assert!(matches!(result, Err(VfsError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn absolute_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = NativeVfs::new(dir.path());
        let result = vfs.write("/etc/passwd", b"pwned").await;
        assert!(matches!(result, Err(VfsError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn list_dir_on_missing_directory_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = NativeVfs::new(dir.path());
        let entries = vfs.list_dir("nope").await.unwrap();
        assert!(entries.is_empty());
    }
}
