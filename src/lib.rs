//! OEE Production Dashboard
//!
//! Loads production records from CSV or Excel, computes Overall Equipment
//! Effectiveness (availability × performance × quality) per machine, shift and
//! time bucket, ranks downtime reasons, and presents the results in an egui
//! desktop dashboard with filtered-data and report export.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod oee;
pub mod report;
