// ⚙️ Harvest Configuration - Settings as Data
// Every constant the run depends on, with defaults that reproduce the stock run

use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_RAW_PATH: &str = "books_dataset.csv";
pub const DEFAULT_CLEANED_PATH: &str = "books_dataset_cleaned.csv";

pub const DEFAULT_GENRES: [&str; 32] = [
    "fiction", "non-fiction", "mystery", "fantasy", "science fiction", "romance",
    "history", "biography", "self-help", "philosophy", "psychology", "thriller",
    "poetry", "graphic novels", "business", "education", "technology", "cooking",
    "health", "science", "sports", "travel", "art", "religion", "humor",
    "young adult", "children", "horror", "comics", "music", "drama", "politics",
];

// ============================================================================
// SOURCE SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleBooksSettings {
    pub enabled: bool,

    /// Volumes endpoint
    pub base_url: String,

    /// One subject query per genre
    pub genres: Vec<String>,

    /// `maxResults` per request, and the offset step
    pub page_size: usize,

    /// Offsets run from 0 up to (not including) this value
    pub max_per_genre: usize,

    /// Only paid e-books, ordered by relevance, and keep `averageRating` as `rating`
    pub paid_with_rating: bool,
}

impl Default for GoogleBooksSettings {
    fn default() -> Self {
        GoogleBooksSettings {
            enabled: true,
            base_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            genres: DEFAULT_GENRES.iter().map(|g| g.to_string()).collect(),
            page_size: 40,
            max_per_genre: 200,
            paid_with_rating: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkoobSettings {
    pub enabled: bool,
    pub base_url: String,

    /// Listing pages 1..=pages
    pub pages: usize,

    /// Also scrape a best-effort rating ("N/A" when absent)
    pub with_rating: bool,

    pub container_selector: String,
    pub title_selector: String,
    pub rating_selector: String,
}

impl Default for SkoobSettings {
    fn default() -> Self {
        SkoobSettings {
            enabled: true,
            base_url: "https://www.skoob.com.br".to_string(),
            pages: 10,
            with_rating: true,
            container_selector: "div.box".to_string(),
            title_selector: "h3".to_string(),
            rating_selector: ".rating".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenLibrarySettings {
    pub enabled: bool,
    pub base_url: String,
    pub subject: String,
    pub limit: usize,
}

impl Default for OpenLibrarySettings {
    fn default() -> Self {
        OpenLibrarySettings {
            enabled: true,
            base_url: "https://openlibrary.org".to_string(),
            subject: "fiction".to_string(),
            limit: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaggleSettings {
    pub enabled: bool,

    /// Dataset handle, `owner/name`
    pub dataset: String,

    /// CSV file inside the downloaded dataset
    pub file: String,

    /// Archive endpoint; the dataset handle is appended as `/owner/name`
    pub download_url: String,

    /// Downloaded datasets are extracted under `cache_dir/owner/name`
    pub cache_dir: PathBuf,
}

impl Default for KaggleSettings {
    fn default() -> Self {
        KaggleSettings {
            enabled: true,
            dataset: "jealousleopard/goodreadsbooks".to_string(),
            file: "books.csv".to_string(),
            download_url: "https://www.kaggle.com/api/v1/datasets/download".to_string(),
            cache_dir: PathBuf::from(".cache/datasets"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalFileSettings {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for LocalFileSettings {
    fn default() -> Self {
        LocalFileSettings {
            enabled: true,
            path: PathBuf::from(DEFAULT_RAW_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub raw_path: PathBuf,
    pub cleaned_path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            raw_path: PathBuf::from(DEFAULT_RAW_PATH),
            cleaned_path: PathBuf::from(DEFAULT_CLEANED_PATH),
        }
    }
}

// ============================================================================
// HARVEST CONFIG
// ============================================================================

/// HarvestConfig - everything one run needs
///
/// Defaults describe the extended run: all five sources enabled, Google Books limited
/// to paid e-books with `averageRating` kept as `rating`, and Skoob scraping ratings.
/// The base run (titles and bibliographic fields only) is the same config with
/// `google_books.paid_with_rating` and `skoob.with_rating` off and the `open_library`
/// and `kaggle` sources disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub google_books: GoogleBooksSettings,
    pub skoob: SkoobSettings,
    pub open_library: OpenLibrarySettings,
    pub kaggle: KaggleSettings,
    pub local_file: LocalFileSettings,
    pub output: OutputSettings,

    /// Pause after every request, in milliseconds
    pub pause_ms: u64,

    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            google_books: GoogleBooksSettings::default(),
            skoob: SkoobSettings::default(),
            open_library: OpenLibrarySettings::default(),
            kaggle: KaggleSettings::default(),
            local_file: LocalFileSettings::default(),
            output: OutputSettings::default(),
            pause_ms: 1000,
            request_timeout_secs: 30,
            user_agent: format!("book-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: HarvestConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.google_books.enabled && self.google_books.page_size == 0 {
            bail!("google_books.page_size must be greater than zero");
        }
        if self.kaggle.enabled && !self.kaggle.dataset.contains('/') {
            bail!(
                "kaggle.dataset must look like owner/name, got {:?}",
                self.kaggle.dataset
            );
        }
        if self.output.raw_path == self.output.cleaned_path {
            bail!("output.cleaned_path must differ from output.raw_path");
        }
        Ok(())
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// TESTS
// ============================================================================
