//! Local on-disk storage shared by the handlers
//!
//! Two locations are injected from configuration: the downloads directory
//! holding generated CSV files, and the single echo file. Every write goes to a
//! temporary sibling first and is renamed into place, so readers never see a
//! partially written file. Concurrent writers remain last-writer-wins.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct Storage {
    downloads_dir: PathBuf,
    echo_file: PathBuf,
}

impl Storage {
    pub fn new(downloads_dir: impl Into<PathBuf>, echo_file: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            echo_file: echo_file.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.downloads_dir, &config.echo_file)
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    pub fn echo_file(&self) -> &Path {
        &self.echo_file
    }

    /// Store `contents` under a fresh `<uuid>.csv` name and return that name.
    ///
    /// The downloads directory is created on first use.
    pub async fn save_download(&self, contents: &[u8]) -> Result<String, StorageError> {
        fs::create_dir_all(&self.downloads_dir).await?;
        let filename = format!("{}.csv", Uuid::new_v4());
        write_atomic(&self.downloads_dir.join(&filename), contents).await?;
        Ok(filename)
    }

    /// Read back a stored download. `filename` must name a file directly
    /// inside the downloads directory.
    pub async fn read_download(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve_download(filename).await?;
        Ok(fs::read(&path).await?)
    }

    /// Overwrite the echo file with `<greeting>,<name>`
    pub async fn write_echo(&self, greeting: &str, name: &str) -> Result<(), StorageError> {
        if let Some(parent) = non_empty_parent(&self.echo_file) {
            fs::create_dir_all(parent).await?;
        }
        write_atomic(&self.echo_file, format!("{greeting},{name}").as_bytes()).await?;
        Ok(())
    }

    /// Map `filename` to a path that is guaranteed to stay inside the downloads
    /// directory, following symlinks before the containment check.
    async fn resolve_download(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if !is_plain_file_name(filename) {
            return Err(StorageError::InvalidName(filename.to_string()));
        }

        let not_found = || StorageError::NotFound(filename.to_string());
        let root = fs::canonicalize(&self.downloads_dir)
            .await
            .map_err(|_| not_found())?;
        let path = fs::canonicalize(root.join(filename))
            .await
            .map_err(|_| not_found())?;

        if !path.starts_with(&root) {
            crate::logger::log_warning(&format!(
                "Path traversal attempt blocked: {filename} -> {}",
                path.display()
            ));
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        if !fs::metadata(&path).await.map_err(|_| not_found())?.is_file() {
            return Err(not_found());
        }
        Ok(path)
    }
}

/// A single normal path component that does not hide as a dotfile
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Write to a temporary file next to `path`, then rename over it
async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = non_empty_parent(path).unwrap_or_else(|| Path::new("."));
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{base}.{}.tmp", Uuid::new_v4().simple()));

    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
