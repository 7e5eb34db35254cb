// Chart model
// One intensity line per channel over a shared time axis in seconds

use serde::{Deserialize, Serialize};

use crate::analysis::IntensityTrace;
use crate::format::metadata::channel_label;
use crate::format::TraceMetadata;

/// One labeled line of the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<u32>,
}

/// Everything a renderer needs to draw the intensity plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,

    /// Shared x axis, bin timestamps in seconds
    pub x: Vec<f64>,

    pub series: Vec<Series>,

    /// Draw grid lines
    pub grid: bool,
}

impl Chart {
    /// Build the intensity plot for a trace
    ///
    /// Timestamps are stored in nanoseconds and converted to seconds here so
    /// the axis label matches the values.
    pub fn from_trace(trace: &IntensityTrace) -> Self {
        let series = trace
            .metadata
            .channels()
            .iter()
            .zip(&trace.channel_lines)
            .map(|(ch, line)| Series {
                label: channel_label(*ch),
                values: line.clone(),
            })
            .collect();

        Chart {
            title: chart_title(&trace.metadata),
            x_label: "Time (s)".to_string(),
            y_label: "Intensity (counts)".to_string(),
            x: trace.times_secs(),
            series,
            grid: true,
        }
    }

    pub fn series_labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }
}

/// Title line with the acquisition settings
fn chart_title(metadata: &TraceMetadata) -> String {
    let mut title = format!(
        "Bin Width: {} us, Laser Period: {} ns",
        display_or_na(metadata.bin_width_micros),
        display_or_na(metadata.laser_period_ns)
    );

    if let Some(secs) = metadata.acquisition_time_secs() {
        title.push_str(&format!(", Acquisition Time: {} s", secs));
    }

    title
}

fn display_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
