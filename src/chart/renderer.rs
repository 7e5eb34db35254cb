// Chart renderers
// Write chart data for external plotting tools

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

use super::model::Chart;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Series \"{label}\" has {actual} points, x axis has {expected}")]
    SeriesLength {
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// Consumer of chart data
pub trait ChartRenderer {
    fn render(&mut self, chart: &Chart) -> Result<(), RenderError>;
}

/// Output formats for chart export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    Json,
    Csv,
}

impl ChartFormat {
    /// Guess the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ChartFormat::Csv,
            _ => ChartFormat::Json,
        }
    }
}

/// Every series must have one value per x point
fn check_series(chart: &Chart) -> Result<(), RenderError> {
    for series in &chart.series {
        if series.values.len() != chart.x.len() {
            return Err(RenderError::SeriesLength {
                label: series.label.clone(),
                expected: chart.x.len(),
                actual: series.values.len(),
            });
        }
    }
    Ok(())
}

/// Writes the whole chart, labels included, as one JSON document
pub struct JsonChartRenderer<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonChartRenderer<W> {
    pub fn new(writer: W) -> Self {
        JsonChartRenderer {
            writer,
            pretty: false,
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartRenderer for JsonChartRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<(), RenderError> {
        check_series(chart)?;

        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, chart)?;
        } else {
            serde_json::to_writer(&mut self.writer, chart)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a table: a `time_s` column followed by one column per series
pub struct CsvChartRenderer<W: Write> {
    writer: W,
}

impl<W: Write> CsvChartRenderer<W> {
    pub fn new(writer: W) -> Self {
        CsvChartRenderer { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartRenderer for CsvChartRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<(), RenderError> {
        check_series(chart)?;

        write!(self.writer, "time_s")?;
        for series in &chart.series {
            write!(self.writer, ",{}", csv_field(&series.label))?;
        }
        writeln!(self.writer)?;

        for (row, x) in chart.x.iter().enumerate() {
            write!(self.writer, "{}", x)?;
            for series in &chart.series {
                write!(self.writer, ",{}", series.values[row])?;
            }
            writeln!(self.writer)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

/// Quote a header field when it contains a separator or quote
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::model::Series;

    fn chart() -> Chart {
        Chart {
            title: "Bin Width: 1000 us, Laser Period: 25 ns".to_string(),
            x_label: "Time (s)".to_string(),
            y_label: "Intensity (counts)".to_string(),
            x: vec![0.0, 0.5, 1.0],
            series: vec![
                Series {
                    label: "Channel 1".to_string(),
                    values: vec![5, 6, 4],
                },
                Series {
                    label: "Channel 3".to_string(),
                    values: vec![7, 0, 9],
                },
            ],
            grid: true,
        }
    }

    #[test]
    fn test_csv_output() {
        let mut renderer = CsvChartRenderer::new(Vec::new());
        renderer.render(&chart()).unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();

        assert_eq!(
            output,
            "time_s,Channel 1,Channel 3\n0,5,7\n0.5,6,0\n1,4,9\n"
        );
    }

    #[test]
    fn test_json_output_round_trips() {
        let mut renderer = JsonChartRenderer::new(Vec::new()).pretty();
        renderer.render(&chart()).unwrap();
        let output = renderer.into_inner();

        let parsed: Chart = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed, chart());
    }

    #[test]
    fn test_series_length_mismatch() {
        let mut bad = chart();
        bad.series[1].values.pop();

        let err = JsonChartRenderer::new(Vec::new()).render(&bad).unwrap_err();
        match err {
            RenderError::SeriesLength {
                label,
                expected,
                actual,
            } => {
                assert_eq!(label, "Channel 3");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected SeriesLength, got {:?}", other),
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ChartFormat::from_path(Path::new("out.CSV")), ChartFormat::Csv);
        assert_eq!(ChartFormat::from_path(Path::new("out.json")), ChartFormat::Json);
        assert_eq!(ChartFormat::from_path(Path::new("out")), ChartFormat::Json);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Channel 1"), "Channel 1");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
