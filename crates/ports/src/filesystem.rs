//! Filesystem boundary contract.

use crate::BoxFuture;
use code_intake_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// A validated, normalized path relative to an import root.
///
/// Implementations MUST reject absolute paths and traversal (e.g. `..` segments).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SafeRelativePath(Box<str>);

impl SafeRelativePath {
    /// Validate and normalize an untrusted relative path.
    pub fn new(input: &str) -> Result<Self> {
        let normalized = normalize_relative_path(input)?;
        Ok(Self(normalized.into_boxed_str()))
    }

    /// Borrow the path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Boundary contract for safe path normalization.
pub trait PathPolicyPort: Send + Sync {
    /// Convert untrusted input into a normalized `SafeRelativePath` or reject it.
    fn to_safe_relative_path(&self, input: &str) -> Result<SafeRelativePath>;
}

/// Borrowing filesystem session bound to an import root.
pub struct FileSystemSession<'a> {
    fs: &'a dyn FileSystemPort,
    import_root: PathBuf,
}

impl<'a> FileSystemSession<'a> {
    /// Create a borrowing session for an import root.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystemPort, import_root: PathBuf) -> Self {
        Self { fs, import_root }
    }

    /// Read and list directory entries relative to the import root.
    pub fn read_dir(
        &self,
        ctx: &RequestContext,
        dir: SafeRelativePath,
    ) -> BoxFuture<'_, Result<Vec<FileSystemDirEntry>>> {
        self.fs.read_dir(ctx, self.import_root.clone(), dir)
    }

    /// Read a UTF-8 text file relative to the import root.
    pub fn read_file_text(
        &self,
        ctx: &RequestContext,
        file: SafeRelativePath,
    ) -> BoxFuture<'_, Result<Box<str>>> {
        self.fs.read_file_text(ctx, self.import_root.clone(), file)
    }

    /// Read file metadata relative to the import root.
    pub fn stat(
        &self,
        ctx: &RequestContext,
        path: SafeRelativePath,
    ) -> BoxFuture<'_, Result<FileSystemStat>> {
        self.fs.stat(ctx, self.import_root.clone(), path)
    }
}

/// Extension helpers for filesystem ports.
pub trait FileSystemPortExt {
    /// Create a borrowing session for an import root.
    fn session(&self, import_root: PathBuf) -> FileSystemSession<'_>;
}

impl<T> FileSystemPortExt for T
where
    T: FileSystemPort,
{
    fn session(&self, import_root: PathBuf) -> FileSystemSession<'_> {
        FileSystemSession::new(self, import_root)
    }
}

impl FileSystemPortExt for Arc<dyn FileSystemPort> {
    fn session(&self, import_root: PathBuf) -> FileSystemSession<'_> {
        FileSystemSession::new(self.as_ref(), import_root)
    }
}

fn normalize_relative_path(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(".".to_owned());
    }
    let replaced = trimmed.replace('\\', "/");
    if is_absolute_like(&replaced) {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "absolute paths are not allowed",
        ));
    }

    let segments: Vec<&str> = replaced
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.iter().any(|segment| *segment == "..") {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "path traversal is not allowed",
        ));
    }

    if segments.is_empty() {
        return Ok(".".to_owned());
    }

    Ok(segments.join("/"))
}

fn is_absolute_like(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    matches!(bytes, [drive, b':', b'/', ..] if drive.is_ascii_alphabetic())
}

/// File system entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemEntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Other / unknown.
    Other,
}

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemDirEntry {
    /// Entry name (single path segment).
    pub name: Box<str>,
    /// Entry kind.
    pub kind: FileSystemEntryKind,
}

/// File system stat info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemStat {
    /// Kind of the entry.
    pub kind: FileSystemEntryKind,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Boundary contract for filesystem access.
///
/// Note: `import_root` is an absolute path owned by the caller composition.
pub trait FileSystemPort: Send + Sync {
    /// Read and list directory entries.
    fn read_dir(
        &self,
        ctx: &RequestContext,
        import_root: PathBuf,
        dir: SafeRelativePath,
    ) -> BoxFuture<'_, Result<Vec<FileSystemDirEntry>>>;

    /// Read a UTF-8 text file.
    fn read_file_text(
        &self,
        ctx: &RequestContext,
        import_root: PathBuf,
        file: SafeRelativePath,
    ) -> BoxFuture<'_, Result<Box<str>>>;

    /// Read file metadata (kind/size).
    fn stat(
        &self,
        ctx: &RequestContext,
        import_root: PathBuf,
        path: SafeRelativePath,
    ) -> BoxFuture<'_, Result<FileSystemStat>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_relative_path_normalizes_separators() {
        let safe = SafeRelativePath::new(".\\src\\\\lib.rs").expect("valid path");
        assert_eq!(safe.as_str(), "src/lib.rs");
    }

    #[test]
    fn empty_input_maps_to_current_dir() {
        let safe = SafeRelativePath::new("  ").expect("valid path");
        assert_eq!(safe.as_str(), ".");
    }

    #[test]
    fn rejects_absolute_and_traversal_paths() {
        assert!(SafeRelativePath::new("/etc").is_err());
        assert!(SafeRelativePath::new("C:/repo").is_err());
        assert!(SafeRelativePath::new("a/../b").is_err());
    }
}
