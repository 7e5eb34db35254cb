// Command-line interface
use clap::Parser;
use std::path::PathBuf;

use crate::chart::ChartFormat;
use crate::config::Settings;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Read and summarize intensity-tracing data files", long_about = None)]
pub struct Cli {
    /// Trace file to read (defaults to the newest intensity-tracing file in the data directory)
    pub path: Option<PathBuf>,

    /// Directory searched for trace files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File name prefix of trace files
    #[arg(long)]
    pub prefix: Option<String>,

    /// Number of leading and trailing timestamps to print
    #[arg(long)]
    pub preview: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the intensity chart data to this file
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Chart file format (guessed from the extension when omitted)
    #[arg(long, value_enum)]
    pub chart_format: Option<ChartFormat>,
}

impl Cli {
    /// Layer the flags over `settings`
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(path) = &self.path {
            settings.file = Some(path.clone());
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = Some(dir.clone());
        }
        if let Some(prefix) = &self.prefix {
            settings.file_prefix = prefix.clone();
        }
        if let Some(preview) = self.preview {
            settings.preview_len = preview;
        }
        settings
    }

    /// Chart destination and format, if a chart was requested
    pub fn chart_target(&self) -> Option<(PathBuf, ChartFormat)> {
        self.chart.as_ref().map(|path| {
            let format = self
                .chart_format
                .unwrap_or_else(|| ChartFormat::from_path(path));
            (path.clone(), format)
        })
    }
}
