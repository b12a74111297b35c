//! OEE module - grouped OEE calculation, downtime Pareto and trends

mod bucket;
mod calculator;
mod kpi;
mod pareto;
mod snapshot;
mod trend;

pub use bucket::TimeBucket;
pub use calculator::{
    DataQualityIssue, GroupBy, GroupKey, GroupResult, Metric, OeeCalculator, OeeResult,
    ProductionTotals,
};
pub use kpi::{GaugeBand, KpiSummary, WORLD_CLASS_OEE};
pub use pareto::{ParetoAnalyzer, ParetoEntry};
pub use snapshot::OeeSnapshot;
pub use trend::{TrendAnalyzer, TrendPoint, TrendStats};
