// Market data sources. The engine treats these as injected collaborators.
pub mod csv_parser;
pub mod market_data;

pub use market_data::{CsvDirectorySource, InMemorySource, MarketDataSource, Period};
