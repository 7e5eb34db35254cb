// Trace file encoder
// Writes IT02 files: magic, JSON metadata block, then one fixed-width record per bin

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};
use thiserror::Error;

use super::decoder::TraceRecord;
use super::metadata::TraceMetadata;
use super::MAGIC;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Metadata block of {0} bytes does not fit a 32-bit length")]
    MetadataTooLarge(usize),

    #[error("Record has {actual} channel counts, file declares {expected}")]
    ChannelCountMismatch { expected: usize, actual: usize },
}

/// Streaming writer for trace files
///
/// The header is written on construction; records follow one at a time.
pub struct TraceWriter<W: Write> {
    writer: W,
    channel_count: usize,
    records_written: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Write the magic and metadata block and return a writer for records
    pub fn new(mut writer: W, metadata: &TraceMetadata) -> Result<Self, EncodeError> {
        let json = serde_json::to_vec(metadata)?;
        let json_length =
            u32::try_from(json.len()).map_err(|_| EncodeError::MetadataTooLarge(json.len()))?;

        writer.write_all(MAGIC)?;
        writer.write_u32::<LittleEndian>(json_length)?;
        writer.write_all(&json)?;

        Ok(TraceWriter {
            writer,
            channel_count: metadata.channel_count(),
            records_written: 0,
        })
    }

    /// Append one record; it must carry exactly one count per declared channel
    pub fn write_record(&mut self, record: &TraceRecord) -> Result<(), EncodeError> {
        if record.channel_counts.len() != self.channel_count {
            return Err(EncodeError::ChannelCountMismatch {
                expected: self.channel_count,
                actual: record.channel_counts.len(),
            });
        }

        self.writer.write_f64::<LittleEndian>(record.time_ns)?;
        for count in &record.channel_counts {
            self.writer.write_u32::<LittleEndian>(*count)?;
        }

        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, EncodeError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encode a complete trace to bytes
pub fn encode_trace(
    metadata: &TraceMetadata,
    records: &[TraceRecord],
) -> Result<Vec<u8>, EncodeError> {
    let mut writer = TraceWriter::new(Vec::new(), metadata)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::decoder::open;
    use crate::format::HEADER_LEN;
    use serde_json::json;
    use std::io::Cursor;

    fn sample_metadata() -> TraceMetadata {
        let mut metadata = TraceMetadata {
            channels: Some(vec![0, 2]),
            bin_width_micros: Some(1000.0),
            acquisition_time_millis: None,
            laser_period_ns: Some(25.0),
            ..Default::default()
        };
        metadata
            .extra
            .insert("card_serial".to_string(), json!("FL-0042"));
        metadata
    }

    #[test]
    fn test_header_layout() {
        let metadata = sample_metadata();
        let bytes = encode_trace(&metadata, &[]).unwrap();

        assert_eq!(&bytes[..4], b"IT02");
        let json_length = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        assert_eq!(bytes.len(), HEADER_LEN + json_length);

        let block: serde_json::Value = serde_json::from_slice(&bytes[HEADER_LEN..]).unwrap();
        assert_eq!(block["channels"], json!([0, 2]));
        assert_eq!(block["card_serial"], "FL-0042");
        // Absent optional fields are omitted rather than written as null
        assert!(block.get("acquisition_time_millis").is_none());
    }

    #[test]
    fn test_round_trip_preserves_metadata_and_order() {
        let metadata = sample_metadata();
        let records: Vec<TraceRecord> = (0..50)
            .map(|i| TraceRecord::new(i as f64 * 1000.0, vec![i, 100 - i]))
            .collect();

        let bytes = encode_trace(&metadata, &records).unwrap();
        let (decoded_metadata, stream) = open(Cursor::new(bytes)).unwrap();
        let decoded: Vec<TraceRecord> = stream.collect::<Result<_, _>>().unwrap();

        assert_eq!(decoded_metadata, metadata);
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_channel_count_mismatch() {
        let mut writer = TraceWriter::new(Vec::new(), &sample_metadata()).unwrap();
        writer
            .write_record(&TraceRecord::new(0.0, vec![1, 2]))
            .unwrap();

        let err = writer
            .write_record(&TraceRecord::new(1.0, vec![1]))
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(writer.records_written(), 1);
    }

    #[test]
    fn test_time_only_records() {
        let metadata = TraceMetadata::default();
        let records = vec![TraceRecord::new(1.0, vec![]), TraceRecord::new(2.0, vec![])];

        let bytes = encode_trace(&metadata, &records).unwrap();
        let json_length = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        assert_eq!(bytes.len() - HEADER_LEN - json_length, 16);
    }
}
