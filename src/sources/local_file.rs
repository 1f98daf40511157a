// 📄 Local File Adapter - rows of an existing CSV, verbatim

use super::{FetchOutcome, SourceAdapter, SourceType};
use crate::table::read_records;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct LocalFileAdapter {
    path: PathBuf,
}

impl LocalFileAdapter {
    pub fn new(path: &Path) -> Self {
        LocalFileAdapter {
            path: path.to_path_buf(),
        }
    }
}

impl SourceAdapter for LocalFileAdapter {
    fn fetch(&self) -> Result<FetchOutcome> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "local file absent, nothing to load");
            return Ok(FetchOutcome::Empty);
        }

        match read_records(&self.path) {
            Ok(records) => {
                info!(path = %self.path.display(), records = records.len(), "local file loaded");
                Ok(FetchOutcome::from_records(records))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "local file unreadable");
                Ok(FetchOutcome::unavailable(format!("{:#}", e)))
            }
        }
    }

    fn source_type(&self) -> SourceType {
        SourceType::LocalFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fields;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_absent_file_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let adapter = LocalFileAdapter::new(&dir.path().join("books_dataset.csv"));

        assert_eq!(adapter.fetch().unwrap(), FetchOutcome::Empty);
    }

    #[test]
    fn test_rows_are_returned_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books_dataset.csv");
        fs::write(&path, "title,isbn,rating\nDom Casmurro,978-85,N/A\n").unwrap();

        let records = LocalFileAdapter::new(&path).fetch().unwrap().into_records();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), Some("Dom Casmurro".to_string()));
        assert_eq!(records[0].text("isbn"), Some("978-85".to_string()));
        assert_eq!(records[0].text(fields::RATING), Some("N/A".to_string()));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books_dataset.csv");
        fs::write(&path, "title,authors\n").unwrap();

        assert_eq!(LocalFileAdapter::new(&path).fetch().unwrap(), FetchOutcome::Empty);
    }
}
