// 📘 Open Library Adapter - one subject request

use super::{FetchOutcome, SourceAdapter, SourceType};
use crate::config::OpenLibrarySettings;
use crate::http::HttpClient;
use crate::record::{fields, join_names, BookRecord, RATING_NOT_AVAILABLE};
use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use tracing::{info, warn};

pub struct OpenLibraryAdapter<'a> {
    http: &'a dyn HttpClient,
    settings: OpenLibrarySettings,
}

impl<'a> OpenLibraryAdapter<'a> {
    pub fn new(http: &'a dyn HttpClient, settings: OpenLibrarySettings) -> Self {
        OpenLibraryAdapter { http, settings }
    }

    /// `{base}/subjects/{subject}.json?limit=N`, subject lowercased with spaces as underscores
    pub fn request_url(&self) -> Result<String> {
        let slug = self.settings.subject.trim().to_lowercase().replace(' ', "_");
        let base = format!(
            "{}/subjects/{}.json",
            self.settings.base_url.trim_end_matches('/'),
            slug
        );
        let url = Url::parse_with_params(&base, &[("limit", self.settings.limit.to_string())])
            .with_context(|| format!("Invalid Open Library URL: {}", base))?;
        Ok(url.to_string())
    }

    pub fn parse_works(body: &Value) -> Vec<BookRecord> {
        let works = match body.get("works").and_then(|w| w.as_array()) {
            Some(works) => works,
            None => return Vec::new(),
        };

        works
            .iter()
            .map(|work| {
                let authors = work
                    .get("authors")
                    .and_then(|a| a.as_array())
                    .map(|list| {
                        join_names(
                            list.iter()
                                .filter_map(|author| author.get("name").and_then(|n| n.as_str())),
                        )
                    })
                    .unwrap_or_default();

                let rating = work
                    .get("rating")
                    .filter(|r| !r.is_null())
                    .cloned()
                    .unwrap_or_else(|| Value::from(RATING_NOT_AVAILABLE));

                BookRecord::new()
                    .with_optional(fields::TITLE, work.get("title").cloned())
                    .with(fields::AUTHORS, authors)
                    .with_optional(fields::PUBLISHED_DATE, work.get("first_publish_year").cloned())
                    .with(fields::RATING, rating)
            })
            .collect()
    }
}

impl SourceAdapter for OpenLibraryAdapter<'_> {
    fn fetch(&self) -> Result<FetchOutcome> {
        let url = self.request_url()?;

        let response = match self.http.get(&url) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "open library: request failed");
                return Ok(FetchOutcome::unavailable(e.to_string()));
            }
        };

        if !response.is_ok() {
            warn!(status = response.status, "open library: non-200");
            return Ok(FetchOutcome::unavailable(format!("HTTP {}", response.status)));
        }

        let body = match response.json() {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "open library: unreadable body");
                return Ok(FetchOutcome::unavailable(format!("invalid JSON: {}", e)));
            }
        };

        let records = Self::parse_works(&body);
        info!(subject = %self.settings.subject, records = records.len(), "open library done");
        Ok(FetchOutcome::from_records(records))
    }

    fn source_type(&self) -> SourceType {
        SourceType::OpenLibrary
    }
}
