//! Charts module - live egui charts and static PNG rendering

mod plotter;
mod renderer;
pub mod style;

pub use plotter::{color32, ChartPlotter};
pub use renderer::{RenderError, RenderedChart, StaticChartRenderer};
