//! Listing paginator
//!
//! Walks `?page=1..=max_pages` of a listing and gathers canonical detail
//! links in first-seen order until the target count is reached or a page
//! comes back without any links.

use crate::config::ListingConfig;
use crate::crawler::{DelayRange, Fetcher};
use crate::url::{canonical_detail_url, listing_page_url};
use crate::{ConfigError, HarvestError};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Collects detail links from a paginated listing
#[derive(Debug, Clone)]
pub struct Paginator {
    link_selector: Selector,
    detail_prefix: String,
    page_delay: DelayRange,
}

impl Paginator {
    /// Creates a paginator for the given listing configuration
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError::InvalidSelector)` - The link selector does not parse
    pub fn new(listing: &ListingConfig, page_delay: DelayRange) -> Result<Self, ConfigError> {
        let link_selector = Selector::parse(&listing.link_selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{}: {:?}", listing.link_selector, e))
        })?;

        Ok(Self {
            link_selector,
            detail_prefix: listing.detail_path_prefix.clone(),
            page_delay,
        })
    }

    /// Collects up to `target_count` unique detail links
    ///
    /// # Termination
    ///
    /// - A page with zero detail links ends the listing
    /// - Reaching `target_count` returns immediately, dropping the rest of
    ///   the current page
    /// - Running out of pages returns whatever was collected
    ///
    /// None of these are errors. A listing page that cannot be fetched is an
    /// error only when it is the first page; later pages end pagination with
    /// a warning.
    pub async fn collect_links(
        &self,
        fetcher: &Fetcher,
        listing_url: &str,
        target_count: usize,
        max_pages: u32,
    ) -> Result<Vec<Url>, HarvestError> {
        let mut collected: Vec<Url> = Vec::new();
        let mut seen: HashSet<Url> = HashSet::new();

        if target_count == 0 {
            return Ok(collected);
        }

        for page in 1..=max_pages {
            let page_url = listing_page_url(listing_url, page);
            let base = Url::parse(&page_url)?;

            let html = match fetcher.fetch(&page_url).await {
                Ok(html) => html,
                Err(failure) if page == 1 => return Err(failure.into()),
                Err(failure) => {
                    tracing::warn!(
                        "Stopping pagination at page {}: {}",
                        page,
                        failure
                    );
                    break;
                }
            };

            let page_links =
                extract_detail_links(&html, &base, &self.link_selector, &self.detail_prefix);
            tracing::debug!("Listing page {} yielded {} links", page, page_links.len());

            if page_links.is_empty() {
                tracing::info!("Listing page {} is empty, end of listing", page);
                break;
            }

            for link in page_links {
                if seen.insert(link.clone()) {
                    collected.push(link);
                }
                if collected.len() >= target_count {
                    tracing::info!(
                        "Reached target of {} links on page {}",
                        target_count,
                        page
                    );
                    return Ok(collected);
                }
            }

            if page < max_pages {
                self.page_delay.pause().await;
            }
        }

        tracing::info!("Collected {} links (target {})", collected.len(), target_count);
        Ok(collected)
    }
}

/// Extracts canonical detail links from one listing page
///
/// Anchors must match `selector` and carry an href starting with
/// `detail_prefix`. Duplicates within the page are dropped, first
/// occurrence wins.
pub fn extract_detail_links(
    html: &str,
    page_url: &Url,
    selector: &Selector,
    detail_prefix: &str,
) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| canonical_detail_url(href, page_url, detail_prefix))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> Selector {
        Selector::parse("a.bookTitle").unwrap()
    }

    fn page_url() -> Url {
        Url::parse("https://example.com/list/show/1.Best?page=1").unwrap()
    }

    #[test]
    fn test_extracts_title_anchors_only() {
        let html = r#"
            <html><body>
                <a class="bookTitle" href="/book/show/1.A?from=list">A</a>
                <a class="authorName" href="/author/show/9.X">X</a>
                <a href="/book/show/2.B">no class</a>
                <a class="bookTitle" href="/book/show/3.C">C</a>
            </body></html>
        "#;
        let links = extract_detail_links(html, &page_url(), &selector(), "/book/show/");
        let links: Vec<&str> = links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/book/show/1.A",
                "https://example.com/book/show/3.C"
            ]
        );
    }

    #[test]
    fn test_skips_foreign_prefix() {
        let html = r#"<a class="bookTitle" href="/series/12">S</a>
                      <a class="bookTitle" href="https://example.com/book/show/4">abs</a>"#;
        let links = extract_detail_links(html, &page_url(), &selector(), "/book/show/");
        assert!(links.is_empty());
    }

    #[test]
    fn test_dedups_within_page() {
        let html = r#"
            <a class="bookTitle" href="/book/show/1.A?x=1">A</a>
            <a class="bookTitle" href="/book/show/1.A?x=2">A again</a>
        "#;
        let links = extract_detail_links(html, &page_url(), &selector(), "/book/show/");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_new_rejects_bad_selector() {
        let listing = ListingConfig {
            link_selector: "a[[".to_string(),
            ..ListingConfig::default()
        };
        assert!(Paginator::new(&listing, DelayRange::ZERO).is_err());
    }

    // Multi-page walks are exercised against a mock server in tests/crawl_tests.rs
}
