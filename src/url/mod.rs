//! URL handling module for Listing-Harvest
//!
//! This module builds paginated listing URLs and turns anchor hrefs found on
//! listing pages into canonical detail-page URLs.

mod normalize;

pub use normalize::canonical_detail_url;

/// Name of the query parameter carrying the listing page index
pub const PAGE_PARAM: &str = "page";

/// Builds the URL of one listing page
///
/// The page parameter is joined with `&` when the base URL already carries a
/// query string and with `?` otherwise.
///
/// # Examples
///
/// ```
/// use listing_harvest::url::listing_page_url;
///
/// assert_eq!(
///     listing_page_url("https://example.com/list/show/1", 2),
///     "https://example.com/list/show/1?page=2"
/// );
/// assert_eq!(
///     listing_page_url("https://example.com/list?sort=new", 3),
///     "https://example.com/list?sort=new&page=3"
/// );
/// ```
pub fn listing_page_url(base: &str, page: u32) -> String {
    let separator = if base.ends_with('?') || base.ends_with('&') {
        ""
    } else if base.contains('?') {
        "&"
    } else {
        "?"
    };
    format!("{}{}{}={}", base, separator, PAGE_PARAM, page)
}
