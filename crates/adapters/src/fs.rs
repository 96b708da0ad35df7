//! Filesystem and path policy adapters.

use code_intake_ports::{
    FileSystemDirEntry, FileSystemEntryKind, FileSystemPort, FileSystemStat, PathPolicyPort,
    SafeRelativePath,
};
use code_intake_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::path::PathBuf;

/// Local filesystem adapter using async IO.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    max_file_size_bytes: Option<u64>,
}

impl LocalFileSystem {
    /// Build a filesystem adapter with an optional max file size.
    pub const fn new(max_file_size_bytes: Option<u64>) -> Self {
        Self {
            max_file_size_bytes,
        }
    }
}

impl FileSystemPort for LocalFileSystem {
    fn read_dir(
        &self,
        _ctx: &RequestContext,
        import_root: PathBuf,
        dir: SafeRelativePath,
    ) -> code_intake_ports::BoxFuture<'_, Result<Vec<FileSystemDirEntry>>> {
        Box::pin(async move {
            let full_path = import_root.join(dir.as_str());
            let mut entries = Vec::new();
            let mut read_dir = tokio::fs::read_dir(&full_path)
                .await
                .map_err(ErrorEnvelope::from)?;

            while let Some(entry) = read_dir.next_entry().await.map_err(ErrorEnvelope::from)? {
                let file_type = entry.file_type().await.map_err(ErrorEnvelope::from)?;
                let kind = if file_type.is_file() {
                    FileSystemEntryKind::File
                } else if file_type.is_dir() {
                    FileSystemEntryKind::Directory
                } else {
                    FileSystemEntryKind::Other
                };
                let name = entry
                    .file_name()
                    .to_string_lossy()
                    .to_string()
                    .into_boxed_str();
                entries.push(FileSystemDirEntry { name, kind });
            }

            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
    }

    fn read_file_text(
        &self,
        _ctx: &RequestContext,
        import_root: PathBuf,
        file: SafeRelativePath,
    ) -> code_intake_ports::BoxFuture<'_, Result<Box<str>>> {
        let max_file_size_bytes = self.max_file_size_bytes;
        Box::pin(async move {
            let full_path = import_root.join(file.as_str());
            let metadata = tokio::fs::metadata(&full_path)
                .await
                .map_err(ErrorEnvelope::from)?;
            if !metadata.is_file() {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "path is not a file",
                ));
            }
            if let Some(limit) = max_file_size_bytes
                && metadata.len() > limit
            {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "file exceeds max size",
                ));
            }

            let contents = tokio::fs::read_to_string(&full_path)
                .await
                .map_err(ErrorEnvelope::from)?;
            Ok(contents.into_boxed_str())
        })
    }

    fn stat(
        &self,
        _ctx: &RequestContext,
        import_root: PathBuf,
        path: SafeRelativePath,
    ) -> code_intake_ports::BoxFuture<'_, Result<FileSystemStat>> {
        Box::pin(async move {
            let full_path = import_root.join(path.as_str());
            let metadata = tokio::fs::metadata(&full_path)
                .await
                .map_err(ErrorEnvelope::from)?;
            let file_type = metadata.file_type();
            let kind = if file_type.is_file() {
                FileSystemEntryKind::File
            } else if file_type.is_dir() {
                FileSystemEntryKind::Directory
            } else {
                FileSystemEntryKind::Other
            };

            Ok(FileSystemStat {
                kind,
                size_bytes: metadata.len(),
            })
        })
    }
}

/// Local path policy for safe relative paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPathPolicy;

impl LocalPathPolicy {
    /// Build a default path policy.
    pub const fn new() -> Self {
        Self
    }
}

impl PathPolicyPort for LocalPathPolicy {
    fn to_safe_relative_path(&self, input: &str) -> Result<SafeRelativePath> {
        SafeRelativePath::new(input)
    }
}
