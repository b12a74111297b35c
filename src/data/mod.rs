//! Data module - production record loading, filtering and export

mod export;
mod filter;
mod loader;
mod record;

pub use export::{DataExporter, ExportError, FILTERED_FILE_NAME, TEMPLATE_FILE_NAME};
pub use filter::{FilterOptions, RecordFilter};
pub use loader::{DataLoader, FileFormat, LoaderError};
pub use record::{ProductionRecord, COLUMNS, DATE_FORMAT, REQUIRED_COLUMNS};

#[cfg(test)]
pub(crate) use record::tests::record;
