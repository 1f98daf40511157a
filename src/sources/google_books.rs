// 📗 Google Books Adapter - paged subject queries against the volumes API

use super::{FetchOutcome, SourceAdapter, SourceType};
use crate::config::GoogleBooksSettings;
use crate::http::{HttpClient, Pacer};
use crate::record::{fields, join_json_strings, BookRecord};
use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

pub struct GoogleBooksAdapter<'a> {
    http: &'a dyn HttpClient,
    pacer: &'a dyn Pacer,
    settings: GoogleBooksSettings,
}

impl<'a> GoogleBooksAdapter<'a> {
    pub fn new(http: &'a dyn HttpClient, pacer: &'a dyn Pacer, settings: GoogleBooksSettings) -> Self {
        GoogleBooksAdapter { http, pacer, settings }
    }

    /// Offsets requested for each genre: 0, page_size, 2*page_size, ... below max_per_genre
    pub fn offsets(&self) -> Vec<usize> {
        (0..self.settings.max_per_genre)
            .step_by(self.settings.page_size.max(1))
            .collect()
    }

    pub fn request_url(&self, genre: &str, start_index: usize) -> Result<String> {
        let mut params = vec![
            ("q", format!("subject:{}", genre)),
            ("startIndex", start_index.to_string()),
            ("maxResults", self.settings.page_size.to_string()),
        ];
        if self.settings.paid_with_rating {
            params.push(("filter", "paid-ebooks".to_string()));
            params.push(("orderBy", "relevance".to_string()));
        }

        let url = Url::parse_with_params(&self.settings.base_url, &params)
            .with_context(|| format!("Invalid Google Books URL: {}", self.settings.base_url))?;
        Ok(url.to_string())
    }

    /// Map a volumes response to records
    ///
    /// In paid-with-rating mode, volumes without `averageRating` are dropped.
    pub fn parse_volumes(&self, body: &Value) -> Vec<BookRecord> {
        let items = match body.get("items").and_then(|i| i.as_array()) {
            Some(items) => items,
            None => return Vec::new(),
        };

        items
            .iter()
            .filter_map(|item| {
                let info = item.get("volumeInfo").cloned().unwrap_or(Value::Null);
                let rating = info.get("averageRating").filter(|r| !r.is_null()).cloned();

                if self.settings.paid_with_rating && rating.is_none() {
                    return None;
                }

                let record = BookRecord::new()
                    .with_optional(fields::TITLE, info.get("title").cloned())
                    .with(fields::AUTHORS, join_json_strings(info.get("authors")))
                    .with_optional(fields::PUBLISHED_DATE, info.get("publishedDate").cloned())
                    .with(fields::CATEGORIES, join_json_strings(info.get("categories")))
                    .with_optional(fields::DESCRIPTION, info.get("description").cloned());

                Some(if self.settings.paid_with_rating {
                    record.with_optional(fields::RATING, rating)
                } else {
                    record
                })
            })
            .collect()
    }
}

impl SourceAdapter for GoogleBooksAdapter<'_> {
    fn fetch(&self) -> Result<FetchOutcome> {
        let mut records = Vec::new();
        let mut attempted = 0;
        let mut failed = 0;

        for genre in &self.settings.genres {
            for start_index in self.offsets() {
                let url = self.request_url(genre, start_index)?;
                attempted += 1;

                match self.http.get(&url) {
                    Ok(response) if response.is_ok() => match response.json() {
                        Ok(body) => {
                            let page = self.parse_volumes(&body);
                            debug!(genre = %genre, start_index, count = page.len(), "google books page");
                            records.extend(page);
                        }
                        Err(e) => {
                            failed += 1;
                            warn!(genre = %genre, start_index, error = %e, "google books: unreadable body, skipping");
                        }
                    },
                    Ok(response) => {
                        failed += 1;
                        warn!(genre = %genre, start_index, status = response.status, "google books: non-200, skipping");
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(genre = %genre, start_index, error = %e, "google books: request failed, skipping");
                    }
                }

                self.pacer.pause();
            }
        }

        info!(records = records.len(), attempted, failed, "google books done");
        Ok(FetchOutcome::settle(records, attempted, failed))
    }

    fn source_type(&self) -> SourceType {
        SourceType::GoogleBooks
    }
}

// ============================================================================
// TESTS
// ============================================================================
