// Storage module
// Finds intensity-tracing files in the acquisition data directory

pub mod locator;

pub use locator::{
    default_data_dir, find_latest_trace_file, LocatedFile, StorageError, StorageResult,
    DEFAULT_FILE_PREFIX,
};
