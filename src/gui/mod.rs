//! GUI module - User interface components

mod app;
mod control_panel;
mod dashboard_view;

pub use app::OeeDashboardApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use dashboard_view::DashboardView;
