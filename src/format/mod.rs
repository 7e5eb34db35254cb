// Trace file format module
// Binary "IT02" container: magic, length-prefixed metadata, fixed-width records

pub mod decoder;
pub mod encoder;
pub mod metadata;

pub use decoder::{open, open_path, DecodeError, RecordStream, Section, TraceRecord};
pub use encoder::{encode_trace, EncodeError, TraceWriter};
pub use metadata::{parse_metadata, MetadataError, TraceMetadata};

/// Magic bytes at offset 0 of every supported file
pub const MAGIC: &[u8; 4] = b"IT02";

/// Size of the magic plus the `json_length` prefix
pub const HEADER_LEN: usize = 8;

/// Bytes occupied by one record carrying `channel_count` counts
pub fn record_size(channel_count: usize) -> usize {
    8 + 4 * channel_count
}
