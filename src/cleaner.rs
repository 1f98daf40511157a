// 🧹 Cleaning Engine - raw dataset → deduplicated, imputed dataset
//
// Order matters and is fixed:
//   1. load raw file
//   2. fixed defaults for authors / published_date / categories / description
//   3. authors imputed per title group (most frequent value)
//   4. drop duplicates on (title, authors), first occurrence wins
//   5. write to a separate path
//
// Step 3 runs after step 2, so every missing author is already "Desconhecido"
// by the time the grouped pass looks. Both passes are kept as they are.

use crate::record::{fields, BookRecord, RecordCollection};
use crate::table::{column_union, read_records, write_records, WriteSummary};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Default used for unknown authors, dates and categories
pub const UNKNOWN: &str = "Desconhecido";
pub const NO_DESCRIPTION: &str = "Sem descrição";

// ============================================================================
// RULES & REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRule {
    pub field: String,
    pub default: String,
}

impl FillRule {
    pub fn new(field: &str, default: &str) -> Self {
        FillRule {
            field: field.to_string(),
            default: default.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_read: usize,

    /// Cells filled by the fixed defaults, per column
    pub filled: BTreeMap<String, usize>,

    /// Cells filled by the title-grouped authors pass
    pub grouped_fills: usize,

    pub duplicates_removed: usize,
    pub rows_written: usize,
}

impl CleaningReport {
    pub fn summary(&self) -> String {
        let filled: usize = self.filled.values().sum();
        format!(
            "Rows: {} → {}, filled cells: {} (+{} grouped), duplicates removed: {}",
            self.rows_read, self.rows_written, filled, self.grouped_fills, self.duplicates_removed
        )
    }
}

/// Cleaned table, kept in memory so callers need not re-read the file
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub records: RecordCollection,
    pub report: CleaningReport,
    pub output: WriteSummary,
}

// ============================================================================
// CLEANING ENGINE
// ============================================================================

pub struct CleaningEngine {
    /// Fixed defaults, applied only to columns present in the table
    defaults: Vec<FillRule>,

    /// Used by the grouped pass when a title group has no authors at all
    group_fallback: String,
}

impl CleaningEngine {
    pub fn new() -> Self {
        CleaningEngine {
            defaults: vec![
                FillRule::new(fields::AUTHORS, UNKNOWN),
                FillRule::new(fields::PUBLISHED_DATE, UNKNOWN),
                FillRule::new(fields::CATEGORIES, UNKNOWN),
                FillRule::new(fields::DESCRIPTION, NO_DESCRIPTION),
            ],
            group_fallback: UNKNOWN.to_string(),
        }
    }

    pub fn rules(&self) -> &[FillRule] {
        &self.defaults
    }

    /// Step 2: fixed defaults for missing cells
    ///
    /// A rule whose column appears in no record is skipped; no column is created.
    /// `rating` has no rule.
    pub fn fill_defaults(&self, records: &mut [BookRecord]) -> BTreeMap<String, usize> {
        let columns: HashSet<String> = column_union(records).into_iter().collect();
        let mut filled = BTreeMap::new();

        for rule in &self.defaults {
            if !columns.contains(&rule.field) {
                continue;
            }

            let mut count = 0;
            for record in records.iter_mut() {
                if record.is_missing(&rule.field) {
                    record.set(&rule.field, rule.default.as_str());
                    count += 1;
                }
            }
            filled.insert(rule.field.clone(), count);
        }

        filled
    }

    /// Step 3: fill missing authors with the most frequent authors value of the
    /// same title (ties → smallest value), or the fallback when the group has none.
    /// Records without a title belong to no group and are left alone, and a table
    /// with no authors column gets none.
    pub fn impute_authors_by_title(&self, records: &mut [BookRecord]) -> usize {
        if !records.iter().any(|r| r.contains_key(fields::AUTHORS)) {
            return 0;
        }

        let mut counts: HashMap<String, BTreeMap<String, usize>> = HashMap::new();

        for record in records.iter() {
            if let (Some(title), Some(authors)) = (record.title(), record.authors()) {
                *counts.entry(title).or_default().entry(authors).or_insert(0) += 1;
            }
        }

        let mut filled = 0;
        for record in records.iter_mut() {
            let title = match record.title() {
                Some(title) => title,
                None => continue,
            };
            if !record.is_missing(fields::AUTHORS) {
                continue;
            }

            let fill = counts
                .get(&title)
                .and_then(most_frequent)
                .unwrap_or_else(|| self.group_fallback.clone());
            record.set(fields::AUTHORS, fill);
            filled += 1;
        }

        filled
    }

    /// Steps 2–4 over an in-memory table
    pub fn clean_records(&self, records: RecordCollection) -> (RecordCollection, CleaningReport) {
        let rows_read = records.len();
        let mut working = records;

        let filled = self.fill_defaults(&mut working);
        let grouped_fills = self.impute_authors_by_title(&mut working);
        let (cleaned, duplicates_removed) = drop_duplicates(working);

        let report = CleaningReport {
            rows_read,
            filled,
            grouped_fills,
            duplicates_removed,
            rows_written: cleaned.len(),
        };
        (cleaned, report)
    }

    /// Full run: read `raw_path`, clean, write `cleaned_path`
    ///
    /// Fails when the raw file cannot be loaded.
    pub fn clean(&self, raw_path: &Path, cleaned_path: &Path) -> Result<CleanedDataset> {
        let raw = read_records(raw_path)
            .with_context(|| format!("Failed to load raw dataset {}", raw_path.display()))?;

        let (records, report) = self.clean_records(raw);

        let output = write_records(cleaned_path, &records).with_context(|| {
            format!("Failed to write cleaned dataset {}", cleaned_path.display())
        })?;

        info!(
            raw = %raw_path.display(),
            cleaned = %cleaned_path.display(),
            rows_read = report.rows_read,
            rows_written = report.rows_written,
            duplicates_removed = report.duplicates_removed,
            "cleaning done"
        );

        Ok(CleanedDataset { records, report, output })
    }
}

impl Default for CleaningEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest count wins; BTreeMap order makes the smallest value win ties
fn most_frequent(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (value, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

/// Step 4: keep the first record for each (title, authors) pair
///
/// Records without a title are never duplicates of anything.
pub fn drop_duplicates(records: RecordCollection) -> (RecordCollection, usize) {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut removed = 0;

    for record in records {
        match record.title() {
            Some(title) => {
                if seen.insert((title, record.authors())) {
                    kept.push(record);
                } else {
                    removed += 1;
                }
            }
            None => kept.push(record),
        }
    }

    (kept, removed)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_record(title: &str, authors: &str, rating: &str) -> BookRecord {
        BookRecord::new()
            .with(fields::TITLE, title)
            .with(fields::AUTHORS, authors)
            .with(fields::RATING, rating)
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let records = vec![
            create_test_record("Dune", "Frank Herbert", "4.2"),
            create_test_record("Dune", "Frank Herbert", "N/A"),
            create_test_record("Dune", "F. Herbert", "3.9"),
            create_test_record("Dune", "Frank Herbert", ""),
        ];

        let (kept, removed) = drop_duplicates(records);

        assert_eq!(removed, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text(fields::RATING), Some("4.2".to_string()));
        assert_eq!(kept[1].authors(), Some("F. Herbert".to_string()));
    }

    #[test]
    fn test_untitled_records_are_never_duplicates() {
        let untitled = BookRecord::new().with(fields::AUTHORS, "Anon");
        let (kept, removed) = drop_duplicates(vec![untitled.clone(), untitled]);

        assert_eq!(removed, 0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_defaults_fill_only_existing_columns() {
        let engine = CleaningEngine::new();
        let mut records = vec![
            BookRecord::new()
                .with(fields::TITLE, "X")
                .with(fields::AUTHORS, "")
                .with(fields::DESCRIPTION, Value::Null)
                .with(fields::RATING, ""),
            BookRecord::new().with(fields::TITLE, "Y"),
        ];

        let filled = engine.fill_defaults(&mut records);

        assert_eq!(filled.get(fields::AUTHORS), Some(&2));
        assert_eq!(filled.get(fields::DESCRIPTION), Some(&2));
        assert_eq!(filled.get(fields::CATEGORIES), None);
        assert_eq!(records[0].authors(), Some(UNKNOWN.to_string()));
        assert_eq!(records[1].text(fields::DESCRIPTION), Some(NO_DESCRIPTION.to_string()));
        assert!(!records[0].contains_key(fields::CATEGORIES));
        // rating is never defaulted
        assert!(records[0].is_missing(fields::RATING));
    }

    #[test]
    fn test_grouped_pass_uses_most_frequent_authors() {
        let engine = CleaningEngine::new();
        let mut records = vec![
            create_test_record("Emma", "Jane Austen", ""),
            create_test_record("Emma", "J. Austen", ""),
            create_test_record("Emma", "Jane Austen", ""),
            create_test_record("Emma", "", ""),
            create_test_record("Orphan", "", ""),
            BookRecord::new().with(fields::AUTHORS, ""),
        ];

        let filled = engine.impute_authors_by_title(&mut records);

        assert_eq!(filled, 2);
        assert_eq!(records[3].authors(), Some("Jane Austen".to_string()));
        assert_eq!(records[4].authors(), Some(UNKNOWN.to_string()));
        // no title, no group
        assert!(records[5].is_missing(fields::AUTHORS));
    }

    #[test]
    fn test_grouped_pass_breaks_ties_by_smallest_value() {
        let engine = CleaningEngine::new();
        let mut records = vec![
            create_test_record("Emma", "Zed", ""),
            create_test_record("Emma", "Amy", ""),
            create_test_record("Emma", "", ""),
        ];

        engine.impute_authors_by_title(&mut records);

        assert_eq!(records[2].authors(), Some("Amy".to_string()));
    }

    #[test]
    fn test_grouped_pass_is_unreachable_after_defaults() {
        let engine = CleaningEngine::new();
        let records = vec![
            create_test_record("Emma", "Jane Austen", ""),
            create_test_record("Emma", "", ""),
        ];

        let (cleaned, report) = engine.clean_records(records);

        // The fixed default wins over the group's "Jane Austen"
        assert_eq!(cleaned[1].authors(), Some(UNKNOWN.to_string()));
        assert_eq!(report.grouped_fills, 0);
        assert_eq!(report.filled.get(fields::AUTHORS), Some(&1));
    }

    #[test]
    fn test_authors_column_is_not_created_when_absent() {
        let engine = CleaningEngine::new();
        let ratings_only = || {
            vec![
                BookRecord::new().with(fields::TITLE, "Dom Casmurro").with(fields::RATING, "N/A"),
                BookRecord::new().with(fields::TITLE, "Helena").with(fields::RATING, "4.0"),
            ]
        };

        let mut records = ratings_only();
        assert_eq!(engine.impute_authors_by_title(&mut records), 0);
        assert!(records.iter().all(|r| !r.contains_key(fields::AUTHORS)));

        let (cleaned, report) = engine.clean_records(ratings_only());

        assert_eq!(report.grouped_fills, 0);
        assert!(report.filled.is_empty());
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.iter().all(|r| !r.contains_key(fields::AUTHORS)));
        let keys: Vec<&str> = cleaned[0].keys().collect();
        assert_eq!(keys, vec!["title", "rating"]);
    }

    #[test]
    fn test_scenario_same_title_different_authors_both_remain() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("books_dataset.csv");
        let cleaned_path = dir.path().join("books_dataset_cleaned.csv");
        fs::write(&raw, "title,authors,rating\nX,,N/A\nX,Y,\n").unwrap();

        let cleaned = CleaningEngine::new().clean(&raw, &cleaned_path).unwrap();

        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.records[0].authors(), Some(UNKNOWN.to_string()));
        assert_eq!(cleaned.records[1].authors(), Some("Y".to_string()));
        assert_eq!(cleaned.records[0].text(fields::RATING), Some("N/A".to_string()));
        assert!(cleaned.records[1].is_missing(fields::RATING));
        assert_eq!(cleaned.report.duplicates_removed, 0);

        let written = fs::read_to_string(&cleaned_path).unwrap();
        assert_eq!(written, "title,authors,rating\nX,Desconhecido,N/A\nX,Y,\n");
        // raw file untouched
        assert_eq!(fs::read_to_string(&raw).unwrap(), "title,authors,rating\nX,,N/A\nX,Y,\n");
    }

    #[test]
    fn test_defaulted_authors_can_collapse_duplicates() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.csv");
        let out = dir.path().join("clean.csv");
        fs::write(
            &raw,
            "title,authors,published_date,categories,description,rating\n\
             A,,2001,,,\n\
             A,,,Fiction,long text,4\n\
             B,Bee,,,,\n",
        )
        .unwrap();

        let cleaned = CleaningEngine::new().clean(&raw, &out).unwrap();

        assert_eq!(cleaned.report.rows_read, 3);
        assert_eq!(cleaned.report.duplicates_removed, 1);
        assert_eq!(cleaned.report.rows_written, 2);
        assert_eq!(cleaned.records[0].text(fields::PUBLISHED_DATE), Some("2001".to_string()));
        assert_eq!(cleaned.records[0].text(fields::CATEGORIES), Some(UNKNOWN.to_string()));
        assert_eq!(cleaned.records[0].text(fields::DESCRIPTION), Some(NO_DESCRIPTION.to_string()));
        assert_eq!(cleaned.output.rows, 2);
    }

    #[test]
    fn test_missing_raw_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = CleaningEngine::new().clean(
            &dir.path().join("absent.csv"),
            &dir.path().join("clean.csv"),
        );

        assert!(result.is_err());
        assert!(!dir.path().join("clean.csv").exists());
    }

    #[test]
    fn test_report_summary() {
        let mut report = CleaningReport {
            rows_read: 10,
            rows_written: 7,
            duplicates_removed: 3,
            ..CleaningReport::default()
        };
        report.filled.insert("authors".to_string(), 4);

        assert_eq!(
            report.summary(),
            "Rows: 10 → 7, filled cells: 4 (+0 grouped), duplicates removed: 3"
        );
    }
}
