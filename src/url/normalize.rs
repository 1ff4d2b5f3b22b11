use url::Url;

/// Resolves a listing-page href into a canonical detail URL
///
/// # Rules
///
/// 1. The raw href must start with `detail_prefix` (site-relative path)
/// 2. It is resolved against the page it was found on
/// 3. Query string and fragment are removed
///
/// # Returns
///
/// `None` when the href is not a detail link or cannot be resolved.
///
/// # Examples
///
/// ```
/// use listing_harvest::url::canonical_detail_url;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/list/show/1?page=2").unwrap();
/// let url = canonical_detail_url("/book/show/42.Dune?from_search=true", &page, "/book/show/");
/// assert_eq!(url.unwrap().as_str(), "https://example.com/book/show/42.Dune");
/// ```
pub fn canonical_detail_url(href: &str, page_url: &Url, detail_prefix: &str) -> Option<Url> {
    let href = href.trim();
    if !href.starts_with(detail_prefix) {
        return None;
    }

    let mut resolved = page_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    strip_query(&mut resolved);
    Some(resolved)
}

/// Removes the query string and fragment from a URL in place
fn strip_query(url: &mut Url) {
    url.set_query(None);
    url.set_fragment(None);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/list/show/1.Best?page=3").unwrap()
    }

    #[test]
    fn test_resolves_relative_detail_link() {
        let url = canonical_detail_url("/book/show/1.A", &page(), "/book/show/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/book/show/1.A");
    }

    #[test]
    fn test_strips_query_and_fragment() {
        let url =
            canonical_detail_url("/book/show/1.A?ref=list#top", &page(), "/book/show/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/book/show/1.A");
    }

    #[test]
    fn test_rejects_other_paths() {
        assert!(canonical_detail_url("/author/show/9", &page(), "/book/show/").is_none());
        assert!(canonical_detail_url("https://other.com/book/show/1", &page(), "/book/show/")
            .is_none());
        assert!(canonical_detail_url("", &page(), "/book/show/").is_none());
    }

    #[test]
    fn test_trims_whitespace() {
        let url = canonical_detail_url("  /book/show/7.G \n", &page(), "/book/show/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/book/show/7.G");
    }
}
