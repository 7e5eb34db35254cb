// Trace analysis module
// Materializes decoded records into per-channel lines and summarizes them

pub mod intensity;
pub mod summary;

pub use intensity::IntensityTrace;
pub use summary::{TraceSummary, DEFAULT_PREVIEW_LEN};
