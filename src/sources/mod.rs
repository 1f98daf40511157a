// 🔌 Source Adapters - one per external book source
//
// Each adapter turns one source into BookRecords, best-effort.
// Failures degrade to "contributes nothing"; only broken page structure is fatal.

pub mod google_books;
pub mod kaggle;
pub mod local_file;
pub mod open_library;
pub mod skoob;

pub use google_books::GoogleBooksAdapter;
pub use kaggle::{DatasetCatalog, KaggleCatalog, KaggleDatasetAdapter};
pub use local_file::LocalFileAdapter;
pub use open_library::OpenLibraryAdapter;
pub use skoob::SkoobScraper;

use crate::config::HarvestConfig;
use crate::http::{HttpClient, Pacer};
use crate::record::{BookRecord, RecordCollection};
use anyhow::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceType - which external source a batch of records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    GoogleBooks,
    Skoob,
    OpenLibrary,
    KaggleDataset,
    LocalFile,
}

impl SourceType {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceType::GoogleBooks => "Google Books",
            SourceType::Skoob => "Skoob",
            SourceType::OpenLibrary => "Open Library",
            SourceType::KaggleDataset => "Kaggle dataset",
            SourceType::LocalFile => "Local file",
        }
    }

    /// Short code for logs
    pub fn code(&self) -> &str {
        match self {
            SourceType::GoogleBooks => "google",
            SourceType::Skoob => "skoob",
            SourceType::OpenLibrary => "openlibrary",
            SourceType::KaggleDataset => "kaggle",
            SourceType::LocalFile => "local",
        }
    }
}

/// What an adapter produced
///
/// `Empty` and `Unavailable` contribute the same thing (nothing) to the run,
/// but only `Unavailable` means the source failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(RecordCollection),
    Empty,
    Unavailable { reason: String },
}

impl FetchOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        FetchOutcome::Unavailable {
            reason: reason.into(),
        }
    }

    /// Settle a multi-request fetch: records win, otherwise it depends on
    /// whether every request failed.
    pub fn settle(records: RecordCollection, attempted: usize, failed: usize) -> Self {
        if !records.is_empty() {
            FetchOutcome::Fetched(records)
        } else if attempted > 0 && failed == attempted {
            FetchOutcome::unavailable(format!("all {} requests failed", attempted))
        } else {
            FetchOutcome::Empty
        }
    }

    pub fn from_records(records: RecordCollection) -> Self {
        if records.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Fetched(records)
        }
    }

    pub fn records(&self) -> &[BookRecord] {
        match self {
            FetchOutcome::Fetched(records) => records,
            _ => &[],
        }
    }

    pub fn into_records(self) -> RecordCollection {
        match self {
            FetchOutcome::Fetched(records) => records,
            _ => Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            FetchOutcome::Fetched(_) => "fetched",
            FetchOutcome::Empty => "empty",
            FetchOutcome::Unavailable { .. } => "unavailable",
        }
    }
}

// ============================================================================
// ADAPTER TRAIT
// ============================================================================

/// SourceAdapter - the one capability every source shares
///
/// `Ok(outcome)` for anything the run can continue past.
/// `Err(_)` only for failures that must abort the run.
pub trait SourceAdapter {
    fn fetch(&self) -> Result<FetchOutcome>;

    fn source_type(&self) -> SourceType;

    /// Adapter version (for logs)
    fn version(&self) -> &str {
        "1.0.0"
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Build the enabled adapters in the fixed run order:
/// Google Books, Skoob, Open Library, Kaggle dataset, local file.
pub fn build_adapters<'a>(
    config: &HarvestConfig,
    http: &'a dyn HttpClient,
    pacer: &'a dyn Pacer,
    catalog: &'a dyn DatasetCatalog,
) -> Vec<Box<dyn SourceAdapter + 'a>> {
    let mut adapters: Vec<Box<dyn SourceAdapter + 'a>> = Vec::new();

    if config.google_books.enabled {
        adapters.push(Box::new(GoogleBooksAdapter::new(
            http,
            pacer,
            config.google_books.clone(),
        )));
    }
    if config.skoob.enabled {
        adapters.push(Box::new(SkoobScraper::new(http, pacer, config.skoob.clone())));
    }
    if config.open_library.enabled {
        adapters.push(Box::new(OpenLibraryAdapter::new(
            http,
            config.open_library.clone(),
        )));
    }
    if config.kaggle.enabled {
        adapters.push(Box::new(KaggleDatasetAdapter::new(
            catalog,
            &config.kaggle.dataset,
            &config.kaggle.file,
        )));
    }
    if config.local_file.enabled {
        adapters.push(Box::new(LocalFileAdapter::new(&config.local_file.path)));
    }

    adapters
}
