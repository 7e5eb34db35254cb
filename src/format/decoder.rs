// Trace file decoder
// Validates the magic, reads the metadata block, then yields fixed-width records lazily

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;
use thiserror::Error;

use super::metadata::{parse_metadata, MetadataError, TraceMetadata};
use super::{record_size, MAGIC};

/// Part of the file a short read happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    MetadataLength,
    Metadata,
    /// Zero-based index of the record being read
    Record(u64),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::MetadataLength => write!(f, "metadata length"),
            Section::Metadata => write!(f, "metadata block"),
            Section::Record(index) => write!(f, "record {}", index),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid magic bytes: expected \"IT02\", found \"{}\"", .found.escape_ascii())]
    InvalidMagic { found: Vec<u8> },

    #[error("truncated {section}: expected {expected} bytes, got {actual}")]
    Truncated {
        section: Section,
        expected: usize,
        actual: usize,
    },

    #[error("invalid metadata: {0}")]
    InvalidMetadata(#[from] MetadataError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One time bin of an intensity trace
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    /// Bin timestamp in nanoseconds
    pub time_ns: f64,

    /// Counts per declared channel, in declared channel order
    pub channel_counts: Vec<u32>,
}

impl TraceRecord {
    pub fn new(time_ns: f64, channel_counts: Vec<u32>) -> Self {
        TraceRecord {
            time_ns,
            channel_counts,
        }
    }

    /// Get timestamp in seconds
    pub fn time_secs(&self) -> f64 {
        self.time_ns / 1e9
    }

    /// Sum of counts over all channels
    pub fn total_counts(&self) -> u64 {
        self.channel_counts.iter().map(|c| u64::from(*c)).sum()
    }
}

/// Open a trace from a byte stream positioned at the start of the file
///
/// Reads the magic and the metadata block eagerly. Records are read on
/// demand through the returned stream, which owns the reader.
pub fn open<R: Read>(mut reader: R) -> Result<(TraceMetadata, RecordStream<R>), DecodeError> {
    let mut magic = [0u8; 4];
    let read = read_full(&mut reader, &mut magic)?;
    if read < magic.len() || &magic != MAGIC {
        return Err(DecodeError::InvalidMagic {
            found: magic[..read].to_vec(),
        });
    }

    let mut length = [0u8; 4];
    let read = read_full(&mut reader, &mut length)?;
    if read < length.len() {
        return Err(DecodeError::Truncated {
            section: Section::MetadataLength,
            expected: length.len(),
            actual: read,
        });
    }
    let json_length = LittleEndian::read_u32(&length) as usize;

    // Grow the buffer as bytes arrive so a bogus length can't force a huge allocation
    let mut block = Vec::new();
    reader
        .by_ref()
        .take(json_length as u64)
        .read_to_end(&mut block)?;
    if block.len() < json_length {
        return Err(DecodeError::Truncated {
            section: Section::Metadata,
            expected: json_length,
            actual: block.len(),
        });
    }

    let metadata = parse_metadata(&block)?;
    let channel_count = metadata.channel_count();

    log::debug!(
        "Opened trace: {} metadata bytes, {} channels, {} bytes per record",
        json_length,
        channel_count,
        record_size(channel_count)
    );

    Ok((metadata, RecordStream::new(reader, channel_count)))
}

/// Open a trace file from disk
///
/// The file handle lives inside the returned stream and is closed when the
/// stream is dropped.
pub fn open_path(
    path: impl AsRef<Path>,
) -> Result<(TraceMetadata, RecordStream<BufReader<File>>), DecodeError> {
    let file = File::open(path.as_ref())?;
    open(BufReader::new(file))
}

/// Lazy, single-pass sequence of records following the metadata block
///
/// Ends cleanly when the stream ends on a record boundary. A partial record
/// yields `DecodeError::Truncated`; after any error the stream is exhausted.
pub struct RecordStream<R> {
    reader: R,
    channel_count: usize,
    buf: Vec<u8>,
    records_read: u64,
    finished: bool,
}

impl<R: Read> RecordStream<R> {
    fn new(reader: R, channel_count: usize) -> Self {
        RecordStream {
            reader,
            channel_count,
            buf: vec![0u8; record_size(channel_count)],
            records_read: 0,
            finished: false,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Bytes consumed per record
    pub fn record_size(&self) -> usize {
        self.buf.len()
    }

    /// Number of records successfully decoded so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    fn read_record(&mut self) -> Result<Option<TraceRecord>, DecodeError> {
        let read = read_full(&mut self.reader, &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        if read < self.buf.len() {
            return Err(DecodeError::Truncated {
                section: Section::Record(self.records_read),
                expected: self.buf.len(),
                actual: read,
            });
        }

        let time_ns = LittleEndian::read_f64(&self.buf[..8]);
        let mut channel_counts = vec![0u32; self.channel_count];
        LittleEndian::read_u32_into(&self.buf[8..], &mut channel_counts);

        self.records_read += 1;
        Ok(Some(TraceRecord {
            time_ns,
            channel_counts,
        }))
    }
}

impl<R> fmt::Debug for RecordStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("channel_count", &self.channel_count)
            .field("records_read", &self.records_read)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<TraceRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                log::debug!("Record stream ended after {} records", self.records_read);
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for RecordStream<R> {}

/// Fill `buf` from `reader`, stopping early only at end of stream.
/// Returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
