// 📦 Kaggle Dataset Adapter - third-party tabular dataset resolved by handle
// Projects the dataset to (title, rating) when it has both columns

use super::{FetchOutcome, SourceAdapter, SourceType};
use crate::record::{fields, BookRecord};
use crate::table::read_table;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// DATASET CATALOG
// ============================================================================

/// Resolve a dataset handle to a local directory holding its files
pub trait DatasetCatalog {
    fn resolve(&self, handle: &str) -> Result<PathBuf>;
}

/// Downloads a dataset archive once and extracts it under `cache_dir/owner/name`
///
/// Uses `KAGGLE_USERNAME` / `KAGGLE_KEY` for basic auth when both are set.
pub struct KaggleCatalog {
    http: reqwest::blocking::Client,
    download_url: String,
    cache_dir: PathBuf,
}

impl KaggleCatalog {
    pub fn new(
        cache_dir: &Path,
        download_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build dataset download client")?;

        Ok(KaggleCatalog {
            http,
            download_url: download_url.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    fn target_dir(&self, handle: &str) -> Result<PathBuf> {
        let (owner, name) = split_handle(handle)?;
        Ok(self.cache_dir.join(owner).join(name))
    }

    fn download(&self, handle: &str, target: &Path) -> Result<()> {
        let url = format!("{}/{}", self.download_url, handle);
        let mut request = self.http.get(&url);
        if let (Ok(user), Ok(key)) = (std::env::var("KAGGLE_USERNAME"), std::env::var("KAGGLE_KEY")) {
            request = request.basic_auth(user, Some(key));
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to download dataset {}", handle))?;
        if !response.status().is_success() {
            bail!("Dataset download for {} returned HTTP {}", handle, response.status().as_u16());
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read dataset archive for {}", handle))?;

        extract_archive(&bytes, target)
            .with_context(|| format!("Failed to unpack dataset {}", handle))
    }
}

/// `target` with `.partial` appended to its file name (`books.v2` → `books.v2.partial`)
fn staging_dir(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

/// Unpack a zip archive into `target`
///
/// Extraction happens in a staging directory that is renamed into place at the end,
/// so a broken archive never leaves a `target` that looks cached.
pub fn extract_archive(bytes: &[u8], target: &Path) -> Result<()> {
    let staging = staging_dir(target);
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to clear {}", staging.display()))?;
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .context("Dataset archive is not a zip file")?;

    fs::create_dir_all(&staging)
        .with_context(|| format!("Failed to create {}", staging.display()))?;

    if let Err(e) = archive.extract(&staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e).context("Failed to extract dataset archive");
    }

    // An empty leftover target would block the rename
    if target.exists() {
        fs::remove_dir_all(target)
            .with_context(|| format!("Failed to clear {}", target.display()))?;
    }
    fs::rename(&staging, target)
        .with_context(|| format!("Failed to move dataset into {}", target.display()))?;
    Ok(())
}

impl DatasetCatalog for KaggleCatalog {
    fn resolve(&self, handle: &str) -> Result<PathBuf> {
        let target = self.target_dir(handle)?;

        if is_populated_dir(&target) {
            debug!(handle, path = %target.display(), "dataset already cached");
            return Ok(target);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        info!(handle, "downloading dataset");
        self.download(handle, &target)?;
        Ok(target)
    }
}

fn split_handle(handle: &str) -> Result<(&str, &str)> {
    match handle.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(anyhow!("Dataset handle must look like owner/name, got {:?}", handle)),
    }
}

fn is_populated_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

// ============================================================================
// ADAPTER
// ============================================================================

pub struct KaggleDatasetAdapter<'a> {
    catalog: &'a dyn DatasetCatalog,
    dataset: String,
    file: String,
}

impl<'a> KaggleDatasetAdapter<'a> {
    pub fn new(catalog: &'a dyn DatasetCatalog, dataset: &str, file: &str) -> Self {
        KaggleDatasetAdapter {
            catalog,
            dataset: dataset.to_string(),
            file: file.to_string(),
        }
    }
}

/// Exact (case-insensitive) name first, otherwise the first header containing it
pub fn find_column<'c>(columns: &'c [String], wanted: &str) -> Option<&'c str> {
    columns
        .iter()
        .find(|c| c.trim().eq_ignore_ascii_case(wanted))
        .or_else(|| columns.iter().find(|c| c.to_lowercase().contains(wanted)))
        .map(String::as_str)
}

impl SourceAdapter for KaggleDatasetAdapter<'_> {
    fn fetch(&self) -> Result<FetchOutcome> {
        let dir = match self.catalog.resolve(&self.dataset) {
            Ok(dir) => dir,
            Err(e) => {
                warn!(dataset = %self.dataset, error = %e, "kaggle: dataset unavailable");
                return Ok(FetchOutcome::unavailable(format!("{:#}", e)));
            }
        };

        let table = match read_table(&dir.join(&self.file)) {
            Ok(table) => table,
            Err(e) => {
                warn!(dataset = %self.dataset, file = %self.file, error = %e, "kaggle: failed to load file");
                return Ok(FetchOutcome::unavailable(format!("{:#}", e)));
            }
        };

        let (title_col, rating_col) = match (
            find_column(&table.columns, fields::TITLE),
            find_column(&table.columns, fields::RATING),
        ) {
            (Some(t), Some(r)) => (t, r),
            _ => {
                info!(dataset = %self.dataset, columns = ?table.columns, "kaggle: no title/rating columns");
                return Ok(FetchOutcome::Empty);
            }
        };

        let records: Vec<BookRecord> = table
            .records
            .iter()
            .map(|row| {
                BookRecord::new()
                    .with(fields::TITLE, row.get(title_col).cloned().unwrap_or(Value::Null))
                    .with(fields::RATING, row.get(rating_col).cloned().unwrap_or(Value::Null))
            })
            .collect();

        info!(dataset = %self.dataset, records = records.len(), rating_column = rating_col, "kaggle done");
        Ok(FetchOutcome::from_records(records))
    }

    fn source_type(&self) -> SourceType {
        SourceType::KaggleDataset
    }
}

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Catalog that resolves every handle to a fixed directory, or fails
#[cfg(test)]
pub(crate) struct StaticCatalog {
    dir: Option<PathBuf>,
}

#[cfg(test)]
impl StaticCatalog {
    pub fn at(dir: &Path) -> Self {
        StaticCatalog { dir: Some(dir.to_path_buf()) }
    }

    pub fn missing() -> Self {
        StaticCatalog { dir: None }
    }
}

#[cfg(test)]
impl DatasetCatalog for StaticCatalog {
    fn resolve(&self, handle: &str) -> Result<PathBuf> {
        self.dir
            .clone()
            .ok_or_else(|| anyhow!("dataset {} not found in catalog", handle))
    }
}
