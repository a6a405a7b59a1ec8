//! File read/write capability used by the reporter and the README patcher

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// Reads and writes whole text files.
///
/// A successful `write` is the completion signal: the contents are on disk
/// (or wherever the implementation keeps them) when it returns.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> Result<String>;

    async fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// `FileStore` backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileStore;

#[async_trait]
impl FileStore for TokioFileStore {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
