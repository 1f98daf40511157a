// 🚜 Harvest Pipeline - fetch → aggregate → persist raw → clean → persist cleaned
// Sequential; nothing touches disk until every adapter has run

use crate::aggregator::aggregate;
use crate::cleaner::{CleanedDataset, CleaningEngine};
use crate::config::HarvestConfig;
use crate::record::RecordCollection;
use crate::sources::{FetchOutcome, SourceAdapter, SourceType};
use crate::table::{write_records, WriteSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// REPORTS
// ============================================================================

/// How one adapter fared
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub source: SourceType,
    pub outcome: String,
    pub records: usize,
    pub reason: Option<String>,
}

impl SourceSummary {
    fn from_outcome(source: SourceType, outcome: &FetchOutcome) -> Self {
        let reason = match outcome {
            FetchOutcome::Unavailable { reason } => Some(reason.clone()),
            _ => None,
        };
        SourceSummary {
            source,
            outcome: outcome.kind().to_string(),
            records: outcome.records().len(),
            reason,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceSummary>,
    pub raw: WriteSummary,
    pub cleaned: CleanedDataset,
}

impl RunReport {
    pub fn total_fetched(&self) -> usize {
        self.sources.iter().map(|s| s.records).sum()
    }

    pub fn elapsed_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

// ============================================================================
// HARVESTER
// ============================================================================

pub struct Harvester<'a> {
    config: &'a HarvestConfig,
    adapters: Vec<Box<dyn SourceAdapter + 'a>>,
    cleaner: CleaningEngine,
}

impl<'a> Harvester<'a> {
    pub fn new(config: &'a HarvestConfig, adapters: Vec<Box<dyn SourceAdapter + 'a>>) -> Self {
        Harvester {
            config,
            adapters,
            cleaner: CleaningEngine::new(),
        }
    }

    /// Run every adapter in order and merge their records
    ///
    /// A fatal adapter error aborts here, before anything is written.
    pub fn fetch_all(&self) -> Result<(Vec<SourceSummary>, RecordCollection)> {
        let mut summaries = Vec::with_capacity(self.adapters.len());
        let mut outcomes = Vec::with_capacity(self.adapters.len());

        for adapter in &self.adapters {
            let source = adapter.source_type();
            info!(source = source.code(), version = adapter.version(), "fetching");

            let outcome = adapter
                .fetch()
                .with_context(|| format!("{} source failed", source.name()))?;

            let summary = SourceSummary::from_outcome(source, &outcome);
            match &summary.reason {
                Some(reason) => warn!(source = source.code(), reason = %reason, "source unavailable"),
                None => info!(source = source.code(), outcome = %summary.outcome, records = summary.records, "source done"),
            }

            summaries.push(summary);
            outcomes.push(outcome);
        }

        Ok((summaries, aggregate(outcomes)))
    }

    pub fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();

        let (sources, records) = self.fetch_all()?;

        let raw_path = &self.config.output.raw_path;
        let raw = write_records(raw_path, &records)
            .with_context(|| format!("Failed to write raw dataset {}", raw_path.display()))?;
        info!(path = %raw_path.display(), rows = raw.rows, columns = raw.columns.len(), "raw dataset written");

        let cleaned = self
            .cleaner
            .clean(raw_path, &self.config.output.cleaned_path)?;

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            sources,
            raw,
            cleaned,
        })
    }

    /// Clean the configured raw dataset without fetching anything
    pub fn clean_only(&self) -> Result<CleanedDataset> {
        self.cleaner
            .clean(&self.config.output.raw_path, &self.config.output.cleaned_path)
    }
}

// ============================================================================
// TESTS
// ============================================================================
