// Intensity Tracing - FLIM intensity-tracing file reader
// Module declarations

use clap::Parser;

pub mod analysis;
pub mod chart;
pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod storage;

use cli::Cli;
use commands::CommandResult;
use config::Settings;

/// Entry point for the command-line tool
pub fn run() -> CommandResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.apply(Settings::from_env());
    log::debug!("Settings: {:?}", settings);

    let inspection = commands::inspect(&settings)?;

    if cli.json {
        println!("{}", inspection.summary.to_json()?);
    } else {
        println!("Using data file: {}", inspection.source.path.display());
        if let Some(modified) = inspection.source.modified {
            println!("Last modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        for line in inspection.summary.lines() {
            println!("{}", line);
        }
    }

    if let Some((path, format)) = cli.chart_target() {
        commands::export_chart(&inspection.chart, format, &path)?;
    }

    Ok(())
}
