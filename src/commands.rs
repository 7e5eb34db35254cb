// Commands run by the CLI
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::analysis::{IntensityTrace, TraceSummary};
use crate::chart::{Chart, ChartFormat, ChartRenderer, CsvChartRenderer, JsonChartRenderer};
use crate::config::Settings;
use crate::storage::find_latest_trace_file;

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Trace file chosen for a run
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSource {
    pub path: PathBuf,

    /// Modification time, known when the file came from the directory lookup
    pub modified: Option<DateTime<Local>>,
}

/// Everything produced from one trace file
#[derive(Debug, Clone)]
pub struct Inspection {
    pub source: TraceSource,
    pub trace: IntensityTrace,
    pub summary: TraceSummary,
    pub chart: Chart,
}

/// Pick the file to read: the explicit path, or the newest in the data directory
pub fn resolve_trace_file(settings: &Settings) -> CommandResult<TraceSource> {
    if let Some(path) = &settings.file {
        return Ok(TraceSource {
            path: path.clone(),
            modified: None,
        });
    }

    let data_dir = settings.data_dir()?;
    let located = find_latest_trace_file(&data_dir, &settings.file_prefix).map_err(|e| {
        CommandError {
            message: format!("Failed to locate trace file: {}", e),
        }
    })?;

    Ok(TraceSource {
        path: located.path,
        modified: Some(located.modified),
    })
}

/// Read a trace file and build its summary and chart
pub fn inspect(settings: &Settings) -> CommandResult<Inspection> {
    let source = resolve_trace_file(settings)?;
    log::info!("Using data file: {}", source.path.display());

    let trace = IntensityTrace::read_path(&source.path).map_err(|e| {
        log::error!("Failed to decode {}: {}", source.path.display(), e);
        CommandError {
            message: format!("Failed to read trace file {}: {}", source.path.display(), e),
        }
    })?;

    log::info!(
        "Decoded trace: {} records, {} channels",
        trace.record_count(),
        trace.channel_count()
    );

    let summary = TraceSummary::from_trace(&trace, settings.preview_len);
    let chart = Chart::from_trace(&trace);

    Ok(Inspection {
        source,
        trace,
        summary,
        chart,
    })
}

/// Render chart data to a file in the requested format
pub fn export_chart(chart: &Chart, format: ChartFormat, path: &Path) -> CommandResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    match format {
        ChartFormat::Json => JsonChartRenderer::new(writer).pretty().render(chart)?,
        ChartFormat::Csv => CsvChartRenderer::new(writer).render(chart)?,
    }

    log::info!(
        "Wrote {:?} chart with {} series to {}",
        format,
        chart.series.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{encode_trace, TraceMetadata, TraceRecord};
    use std::fs;
    use tempfile::TempDir;

    fn write_trace(dir: &Path, name: &str, records: usize) -> PathBuf {
        let metadata = TraceMetadata {
            channels: Some(vec![0, 2]),
            bin_width_micros: Some(1000.0),
            acquisition_time_millis: Some(5000.0),
            laser_period_ns: Some(25.0),
            ..Default::default()
        };
        let records: Vec<TraceRecord> = (0..records)
            .map(|i| TraceRecord::new(i as f64 * 1_000_000.0, vec![i as u32, 1]))
            .collect();

        let path = dir.join(name);
        fs::write(&path, encode_trace(&metadata, &records).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_inspect_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_trace(temp_dir.path(), "run.bin", 4);

        let settings = Settings {
            file: Some(path.clone()),
            preview_len: 2,
            ..Default::default()
        };
        let inspection = inspect(&settings).unwrap();

        assert_eq!(inspection.source.path, path);
        assert_eq!(inspection.source.modified, None);
        assert_eq!(inspection.summary.record_count, 4);
        assert_eq!(inspection.summary.channel_totals, vec![6, 4]);
        assert_eq!(inspection.summary.last_times_ns, vec![2_000_000.0, 3_000_000.0]);
        assert_eq!(inspection.chart.series.len(), 2);
    }

    #[test]
    fn test_inspect_uses_data_dir_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_trace(temp_dir.path(), "intensity-tracing_1.bin", 2);

        let settings = Settings {
            data_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let inspection = inspect(&settings).unwrap();

        assert_eq!(inspection.source.path, path);
        assert!(inspection.source.modified.is_some());
    }

    #[test]
    fn test_inspect_reports_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            data_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let err = inspect(&settings).unwrap_err();
        assert!(err.message().starts_with("Failed to locate trace file"));
    }

    #[test]
    fn test_inspect_reports_bad_magic() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("intensity-tracing_old.bin");
        fs::write(&path, b"IT01\x02\x00\x00\x00{}").unwrap();

        let settings = Settings {
            file: Some(path),
            ..Default::default()
        };
        let err = inspect(&settings).unwrap_err();
        assert!(err.message().contains("invalid magic bytes"));
    }

    #[test]
    fn test_export_chart_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_trace(temp_dir.path(), "run.bin", 3);
        let trace = IntensityTrace::read_path(&path).unwrap();
        let chart = Chart::from_trace(&trace);

        let out = temp_dir.path().join("chart.csv");
        export_chart(&chart, ChartFormat::Csv, &out).unwrap();

        let csv = fs::read_to_string(&out).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], "time_s,Channel 1,Channel 3");
        assert_eq!(rows[1], "0,0,1");
    }

    #[test]
    fn test_export_chart_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_trace(temp_dir.path(), "run.bin", 3);
        let chart = Chart::from_trace(&IntensityTrace::read_path(&path).unwrap());

        let out = temp_dir.path().join("chart.json");
        export_chart(&chart, ChartFormat::Json, &out).unwrap();

        let parsed: Chart = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed.series_labels(), vec!["Channel 1", "Channel 3"]);
        assert_eq!(parsed.series[0].values, vec![0, 1, 2]);
    }
}
