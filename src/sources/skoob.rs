// 📙 Skoob Scraper - community listing pages
// Assumes a stable page structure: a container without a title aborts the run

use super::{FetchOutcome, SourceAdapter, SourceType};
use crate::config::SkoobSettings;
use crate::http::{HttpClient, Pacer};
use crate::record::{fields, BookRecord, RATING_NOT_AVAILABLE};
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

pub struct SkoobScraper<'a> {
    http: &'a dyn HttpClient,
    pacer: &'a dyn Pacer,
    settings: SkoobSettings,
}

impl<'a> SkoobScraper<'a> {
    pub fn new(http: &'a dyn HttpClient, pacer: &'a dyn Pacer, settings: SkoobSettings) -> Self {
        SkoobScraper { http, pacer, settings }
    }

    pub fn page_url(&self, page: usize) -> String {
        format!(
            "{}/livro/lista/todos/todos/todos/{}.html",
            self.settings.base_url.trim_end_matches('/'),
            page
        )
    }

    /// Extract one record per container on a listing page
    pub fn parse_listing(&self, html: &str) -> Result<Vec<BookRecord>> {
        let container = parse_selector(&self.settings.container_selector)?;
        let title = parse_selector(&self.settings.title_selector)?;
        let rating = parse_selector(&self.settings.rating_selector)?;

        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for (idx, book) in document.select(&container).enumerate() {
            let heading = book.select(&title).next().ok_or_else(|| {
                anyhow!(
                    "container #{} has no {:?} element",
                    idx + 1,
                    self.settings.title_selector
                )
            })?;

            let mut record = BookRecord::new().with(fields::TITLE, element_text(heading));

            if self.settings.with_rating {
                let value = book
                    .select(&rating)
                    .next()
                    .map(element_text)
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| RATING_NOT_AVAILABLE.to_string());
                record.set(fields::RATING, value);
            }

            records.push(record);
        }

        Ok(records)
    }
}

impl SourceAdapter for SkoobScraper<'_> {
    fn fetch(&self) -> Result<FetchOutcome> {
        let mut records = Vec::new();
        let mut failed = 0;

        for page in 1..=self.settings.pages {
            let url = self.page_url(page);

            match self.http.get(&url) {
                Ok(response) if response.is_ok() => {
                    let page_records = self
                        .parse_listing(&response.body)
                        .map_err(|e| anyhow!("Skoob page {} has unexpected structure: {}", page, e))?;
                    debug!(page, count = page_records.len(), "skoob page");
                    records.extend(page_records);
                }
                Ok(response) => {
                    failed += 1;
                    warn!(page, status = response.status, "skoob: non-200, skipping page");
                }
                Err(e) => {
                    failed += 1;
                    warn!(page, error = %e, "skoob: request failed, skipping page");
                }
            }

            self.pacer.pause();
        }

        info!(records = records.len(), pages = self.settings.pages, failed, "skoob done");
        Ok(FetchOutcome::settle(records, self.settings.pages, failed))
    }

    fn source_type(&self) -> SourceType {
        SourceType::Skoob
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid CSS selector {:?}: {}", css, e))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::{CountingPacer, MockHttp};

    const LISTING: &str = r#"
        <html><body>
          <div class="box"><h3> O Alienista </h3><span class="rating">4.1</span></div>
          <div class="box destaque"><h3>Memórias Póstumas</h3></div>
          <div class="sidebar"><h3>Not a book</h3></div>
        </body></html>
    "#;

    fn create_test_settings(pages: usize, with_rating: bool) -> SkoobSettings {
        SkoobSettings {
            base_url: "https://skoob.test/".to_string(),
            pages,
            with_rating,
            ..SkoobSettings::default()
        }
    }

    #[test]
    fn test_page_url() {
        let http = MockHttp::new();
        let pacer = CountingPacer::new();
        let scraper = SkoobScraper::new(&http, &pacer, create_test_settings(1, false));

        assert_eq!(
            scraper.page_url(3),
            "https://skoob.test/livro/lista/todos/todos/todos/3.html"
        );
    }

    #[test]
    fn test_parse_titles_only() {
        let http = MockHttp::new();
        let pacer = CountingPacer::new();
        let scraper = SkoobScraper::new(&http, &pacer, create_test_settings(1, false));

        let records = scraper.parse_listing(LISTING).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title(), Some("O Alienista".to_string()));
        assert_eq!(records[1].title(), Some("Memórias Póstumas".to_string()));
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn test_missing_rating_becomes_na_literal() {
        let http = MockHttp::new();
        let pacer = CountingPacer::new();
        let scraper = SkoobScraper::new(&http, &pacer, create_test_settings(1, true));

        let records = scraper.parse_listing(LISTING).unwrap();

        assert_eq!(records[0].text(fields::RATING), Some("4.1".to_string()));
        assert_eq!(records[1].text(fields::RATING), Some("N/A".to_string()));
    }

    #[test]
    fn test_container_without_title_aborts() {
        let html = r#"<div class="box"><h3>Ok</h3></div><div class="box"><p>no heading</p></div>"#;
        let http = MockHttp::new().respond("/2.html", 200, html);
        let pacer = CountingPacer::new();
        let scraper = SkoobScraper::new(&http, &pacer, create_test_settings(2, false));

        let result = scraper.fetch();

        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Skoob page 2"));
    }

    #[test]
    fn test_fetch_walks_pages_and_skips_failures() {
        let http = MockHttp::new()
            .respond("/1.html", 200, LISTING)
            .fail("/2.html", "timeout")
            .respond("/3.html", 200, r#"<div class="box"><h3>Helena</h3></div>"#);
        let pacer = CountingPacer::new();
        let scraper = SkoobScraper::new(&http, &pacer, create_test_settings(4, false));

        let outcome = scraper.fetch().unwrap();

        let titles: Vec<String> = outcome.records().iter().filter_map(|r| r.title()).collect();
        assert_eq!(titles, vec!["O Alienista", "Memórias Póstumas", "Helena"]);
        assert_eq!(pacer.count(), 4);
    }
}
