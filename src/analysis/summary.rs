// Trace summary
// Acquisition settings and count statistics printed after a file is read

use serde::{Deserialize, Serialize};

use super::intensity::IntensityTrace;

/// Number of leading and trailing timestamps included by default
pub const DEFAULT_PREVIEW_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Enabled channels, numbered from 1
    pub enabled_channels: Vec<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_width_micros: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_time_secs: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub laser_period_ns: Option<f64>,

    pub record_count: usize,

    /// Total counts per enabled channel, same order as `enabled_channels`
    pub channel_totals: Vec<u64>,

    /// Up to `preview_len` timestamps from the start of the trace, in ns
    pub first_times_ns: Vec<f64>,

    /// Up to `preview_len` timestamps from the end of the trace, in ns
    pub last_times_ns: Vec<f64>,
}

impl TraceSummary {
    pub fn from_trace(trace: &IntensityTrace, preview_len: usize) -> Self {
        let metadata = &trace.metadata;
        let times = &trace.times_ns;
        let head = preview_len.min(times.len());
        let tail = times.len().saturating_sub(preview_len);

        TraceSummary {
            enabled_channels: metadata
                .channels()
                .iter()
                .map(|ch| u64::from(*ch) + 1)
                .collect(),
            bin_width_micros: metadata.bin_width_micros,
            acquisition_time_secs: metadata.acquisition_time_secs(),
            laser_period_ns: metadata.laser_period_ns,
            record_count: trace.record_count(),
            channel_totals: trace.channel_totals(),
            first_times_ns: times[..head].to_vec(),
            last_times_ns: times[tail..].to_vec(),
        }
    }

    /// Human-readable report, one line per entry
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.enabled_channels.is_empty() {
            let channels: Vec<String> = self
                .enabled_channels
                .iter()
                .map(|ch| format!("Channel {}", ch))
                .collect();
            lines.push(format!("Enabled channels: {}", channels.join(", ")));
        }
        if let Some(bin_width) = self.bin_width_micros {
            lines.push(format!("Bin width: {}\u{00B5}s", bin_width));
        }
        if let Some(secs) = self.acquisition_time_secs {
            lines.push(format!("Acquisition time: {}s", secs));
        }
        if let Some(period) = self.laser_period_ns {
            lines.push(format!("Laser period: {}ns", period));
        }

        lines.push(format!("Total records: {}", self.record_count));
        for (ch, total) in self.enabled_channels.iter().zip(&self.channel_totals) {
            lines.push(format!("Channel {} total counts: {}", ch, total));
        }

        lines.push(format!("First {} time ns:", self.first_times_ns.len()));
        lines.push(format!("{:?}", self.first_times_ns));
        lines.push(format!("Last {} time ns:", self.last_times_ns.len()));
        lines.push(format!("{:?}", self.last_times_ns));

        lines
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
