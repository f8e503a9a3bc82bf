//! Data module - CSV loading and selection narrowing

mod loader;
mod processor;
mod record;

pub use loader::{parse_date, DataLoader, DataSource, DataSourceError, DatePolicy};
pub use processor::{DataProcessor, SelectionFilter};
pub use record::{PriceRecord, PriceTable, SeriesKey};
