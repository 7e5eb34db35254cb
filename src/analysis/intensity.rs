// Intensity trace
// Column-oriented view of a decoded file: one time axis, one count line per channel

use std::io::Read;
use std::path::Path;

use crate::format::{open, open_path, DecodeError, RecordStream, TraceMetadata, TraceRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct IntensityTrace {
    pub metadata: TraceMetadata,

    /// Bin timestamps in nanoseconds, in file order
    pub times_ns: Vec<f64>,

    /// Counts per declared channel; every line is as long as `times_ns`
    pub channel_lines: Vec<Vec<u32>>,
}

impl IntensityTrace {
    /// Drain a record stream into memory
    ///
    /// Any decode error aborts the build; partial traces are not returned.
    pub fn from_stream<R: Read>(
        metadata: TraceMetadata,
        stream: RecordStream<R>,
    ) -> Result<Self, DecodeError> {
        let mut times_ns = Vec::new();
        let mut channel_lines = vec![Vec::new(); metadata.channel_count()];

        for record in stream {
            let record = record?;
            for (line, count) in channel_lines.iter_mut().zip(&record.channel_counts) {
                line.push(*count);
            }
            times_ns.push(record.time_ns);
        }

        log::debug!(
            "Read {} records across {} channels",
            times_ns.len(),
            channel_lines.len()
        );

        Ok(IntensityTrace {
            metadata,
            times_ns,
            channel_lines,
        })
    }

    /// Decode a whole trace from a byte stream
    pub fn read_from<R: Read>(reader: R) -> Result<Self, DecodeError> {
        let (metadata, stream) = open(reader)?;
        Self::from_stream(metadata, stream)
    }

    /// Decode a whole trace file from disk
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let (metadata, stream) = open_path(path)?;
        Self::from_stream(metadata, stream)
    }

    pub fn record_count(&self) -> usize {
        self.times_ns.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_lines.len()
    }

    /// Sum of counts for each channel
    pub fn channel_totals(&self) -> Vec<u64> {
        self.channel_lines
            .iter()
            .map(|line| line.iter().map(|c| u64::from(*c)).sum())
            .collect()
    }

    /// Timestamps converted to seconds
    pub fn times_secs(&self) -> Vec<f64> {
        self.times_ns.iter().map(|t| t / 1e9).collect()
    }

    /// Time between the first and last bin, in nanoseconds
    pub fn span_ns(&self) -> Option<f64> {
        match (self.times_ns.first(), self.times_ns.last()) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }

    /// Rebuild the record at `index`
    pub fn record(&self, index: usize) -> Option<TraceRecord> {
        let time_ns = *self.times_ns.get(index)?;
        let channel_counts = self.channel_lines.iter().map(|line| line[index]).collect();
        Some(TraceRecord::new(time_ns, channel_counts))
    }
}
