// File system lookups for acquisition data files
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// File name prefix used by the acquisition software for tracing runs
pub const DEFAULT_FILE_PREFIX: &str = "intensity-tracing";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to get home directory")]
    NoHomeDir,
    #[error("No files starting with \"{prefix}\" in {}", .dir.display())]
    NoTraceFiles { dir: PathBuf, prefix: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A data file picked by the locator
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedFile {
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

/// Get the directory the acquisition software writes data files to
pub fn default_data_dir() -> StorageResult<PathBuf> {
    let home = dirs::home_dir().ok_or(StorageError::NoHomeDir)?;
    Ok(home.join(".flim-labs").join("data"))
}

/// Find the most recently modified file in `dir` whose name starts with `prefix`
pub fn find_latest_trace_file(dir: &Path, prefix: &str) -> StorageResult<LocatedFile> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let matches = name.to_str().map_or(false, |n| n.starts_with(prefix));
        if !matches {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified()?;
        let newer = latest.as_ref().map_or(true, |(best, _)| modified > *best);
        if newer {
            latest = Some((modified, entry.path()));
        }
    }

    let (modified, path) = latest.ok_or_else(|| StorageError::NoTraceFiles {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string(),
    })?;

    log::debug!("Latest trace file: {}", path.display());

    Ok(LocatedFile {
        path,
        modified: DateTime::<Local>::from(modified),
    })
}
