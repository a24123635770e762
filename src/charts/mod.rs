//! Charts module - Chart definitions and rendering

pub mod catalog;
mod model;
mod plotter;
mod renderer;

pub use model::{
    format_value, marker_radius, ChartData, ChartFactory, PieChart, PieSlice, ScatterChart,
    ScatterPoint, ScatterSeries, MAX_MARKER_RADIUS,
};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
