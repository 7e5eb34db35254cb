// Chart module
// Line chart data built from a trace, and the renderers that consume it

pub mod model;
pub mod renderer;

pub use model::{Chart, Series};
pub use renderer::{ChartFormat, ChartRenderer, CsvChartRenderer, JsonChartRenderer, RenderError};
