// Book Harvest - Core Library
// Exposes all modules for use in the CLI and tests

pub mod record;
pub mod table;
pub mod http;
pub mod config;
pub mod sources;
pub mod aggregator;
pub mod cleaner;
pub mod pipeline;

// Re-export commonly used types
pub use record::{BookRecord, RecordCollection, RATING_NOT_AVAILABLE};
pub use table::{column_union, read_records, read_table, write_records, Table, WriteSummary};
pub use http::{FixedPause, HttpClient, HttpError, HttpResponse, Pacer, ReqwestClient};
pub use config::{
    HarvestConfig, GoogleBooksSettings, SkoobSettings, OpenLibrarySettings,
    KaggleSettings, LocalFileSettings, OutputSettings,
};
pub use sources::{
    build_adapters, FetchOutcome, SourceAdapter, SourceType,
    GoogleBooksAdapter, SkoobScraper, OpenLibraryAdapter,
    DatasetCatalog, KaggleCatalog, KaggleDatasetAdapter, LocalFileAdapter,
};
pub use aggregator::aggregate;
pub use cleaner::{CleaningEngine, CleaningReport, CleanedDataset, FillRule, drop_duplicates};
pub use pipeline::{Harvester, RunReport, SourceSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
