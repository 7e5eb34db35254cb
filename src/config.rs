// Runtime settings
// Defaults, overridden by the environment, then by command-line flags

use std::ffi::OsString;
use std::path::PathBuf;

use crate::analysis::DEFAULT_PREVIEW_LEN;
use crate::storage::{default_data_dir, StorageResult, DEFAULT_FILE_PREFIX};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "FLIM_LABS_DATA_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Explicit trace file; skips the directory lookup when set
    pub file: Option<PathBuf>,

    /// Directory searched for the newest trace file
    pub data_dir: Option<PathBuf>,

    /// File name prefix of tracing files
    pub file_prefix: String,

    /// Number of leading/trailing timestamps in the summary
    pub preview_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            file: None,
            data_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl Settings {
    /// Defaults with process environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var_os(key))
    }

    /// Apply overrides from an environment lookup
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Directory to search, falling back to the acquisition software default
    pub fn data_dir(&self) -> StorageResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}
