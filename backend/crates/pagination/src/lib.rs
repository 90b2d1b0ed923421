//! Page-number pagination primitives shared by YaMDb list endpoints.
//!
//! A [`PageRequest`] captures a validated `page`/`page_size` pair and exposes
//! the offset and limit a repository needs. A [`Page`] is the response
//! envelope (`count`, `next`, `previous`, `results`) with absolute links
//! derived from the request URL, so clients can walk a collection without
//! reconstructing query strings themselves.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for caller-supplied page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

const PAGE_PARAM: &str = "page";

/// Errors raised while validating pagination input or building envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The requested page number is zero.
    #[error("page numbers start at 1")]
    InvalidPage,
    /// The requested page size is zero or above the allowed maximum.
    #[error("page size must be between 1 and {max}")]
    InvalidPageSize {
        /// Largest accepted page size.
        max: u32,
    },
    /// The requested page lies beyond the last page of results.
    #[error("page {page} does not exist")]
    PageOutOfRange {
        /// The page that was requested.
        page: u32,
    },
}

/// Validated page-number request.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 20).expect("valid request");
/// assert_eq!(request.offset(), 40);
/// assert_eq!(request.limit(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a page number (1-based) and page size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] for page zero and
    /// [`PaginationError::InvalidPageSize`] when the size is zero or larger
    /// than [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidPageSize { max: MAX_PAGE_SIZE });
        }
        Ok(Self { page, page_size })
    }

    /// Build a request from optional query values, applying defaults.
    ///
    /// # Errors
    ///
    /// Propagates the validation errors of [`PageRequest::new`].
    pub const fn from_query(
        page: Option<u32>,
        page_size: Option<u32>,
        default_page_size: u32,
    ) -> Result<Self, PaginationError> {
        let number = match page {
            Some(number) => number,
            None => 1,
        };
        let size = match page_size {
            Some(size) => size,
            None => default_page_size,
        };
        Self::new(number, size)
    }

    /// First page with the given size, falling back to [`DEFAULT_PAGE_SIZE`]
    /// when the size is out of bounds.
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        match Self::new(1, page_size) {
            Ok(request) => request,
            Err(_) => Self {
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
            },
        }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Paginated response envelope.
///
/// Derives an OpenAPI schema so handlers can document `Page<Body>`
/// responses directly.
///
/// # Examples
/// ```
/// use pagination::{Page, PageRequest};
/// use url::Url;
///
/// let base = Url::parse("http://localhost/api/v1/titles/?page=1").expect("url");
/// let request = PageRequest::new(1, 2).expect("request");
/// let page = Page::build(vec!["a", "b"], 3, request, &base).expect("page");
/// assert_eq!(page.count, 3);
/// assert_eq!(
///     page.next.as_deref(),
///     Some("http://localhost/api/v1/titles/?page=2")
/// );
/// assert!(page.previous.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// Absolute URL of the next page, when one exists.
    pub next: Option<String>,
    /// Absolute URL of the previous page, when one exists.
    pub previous: Option<String>,
    /// Items on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble an envelope for `results`, the items of `request`'s page.
    ///
    /// `count` is the total number of items matching the query. `base` is
    /// the URL the client requested; its query string is preserved apart
    /// from the `page` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::PageOutOfRange`] when a page other than
    /// the first starts beyond the end of the collection.
    pub fn build(
        results: Vec<T>,
        count: u64,
        request: PageRequest,
        base: &Url,
    ) -> Result<Self, PaginationError> {
        if request.page() > 1 && request.offset() >= count {
            return Err(PaginationError::PageOutOfRange {
                page: request.page(),
            });
        }

        let seen = request.offset() + request.limit();
        let next = (seen < count).then(|| page_link(base, request.page().saturating_add(1)));
        let previous = (request.page() > 1).then(|| page_link(base, request.page() - 1));

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    /// Convert each result while keeping the envelope metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Rewrite `base` so that it points at `page`.
///
/// The first page is addressed without an explicit `page` parameter.
fn page_link(base: &Url, page: u32) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut link = base.clone();
    link.set_query(None);
    if !retained.is_empty() || page > 1 {
        let mut pairs = link.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair(PAGE_PARAM, &page.to_string());
        }
    }
    link.into()
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests fail fast on fixture errors")]
mod tests {
    //! Unit coverage for request validation and link construction.
    use super::*;
    use rstest::rstest;

    fn base(query: &str) -> Url {
        Url::parse(&format!("http://api.test/api/v1/titles/{query}")).expect("valid url")
    }

    #[rstest]
    #[case(0, 10, PaginationError::InvalidPage)]
    #[case(1, 0, PaginationError::InvalidPageSize { max: MAX_PAGE_SIZE })]
    #[case(1, 101, PaginationError::InvalidPageSize { max: MAX_PAGE_SIZE })]
    fn rejects_invalid_requests(
        #[case] page: u32,
        #[case] page_size: u32,
        #[case] expected: PaginationError,
    ) {
        assert_eq!(PageRequest::new(page, page_size), Err(expected));
    }

    #[rstest]
    fn from_query_applies_defaults() {
        let request = PageRequest::from_query(None, None, 25).expect("defaults are valid");
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 25);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    fn first_falls_back_when_size_is_invalid() {
        assert_eq!(PageRequest::first(0).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::first(5).page_size(), 5);
    }

    #[rstest]
    fn middle_page_links_both_ways_and_keeps_filters() {
        let request = PageRequest::new(2, 2).expect("request");
        let page = Page::build(vec![3, 4], 5, request, &base("?genre=drama&page=2"))
            .expect("page in range");

        assert_eq!(
            page.next.as_deref(),
            Some("http://api.test/api/v1/titles/?genre=drama&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://api.test/api/v1/titles/?genre=drama")
        );
    }

    #[rstest]
    fn last_page_has_no_next_link() {
        let request = PageRequest::new(3, 2).expect("request");
        let page = Page::build(vec![5], 5, request, &base("?page=3")).expect("page in range");

        assert!(page.next.is_none());
        assert_eq!(
            page.previous.as_deref(),
            Some("http://api.test/api/v1/titles/?page=2")
        );
    }

    #[rstest]
    fn empty_first_page_is_valid() {
        let page: Page<u8> =
            Page::build(Vec::new(), 0, PageRequest::default(), &base("")).expect("first page");
        assert_eq!(page.count, 0);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[rstest]
    fn page_past_the_end_is_rejected() {
        let request = PageRequest::new(4, 2).expect("request");
        let result: Result<Page<u8>, _> = Page::build(Vec::new(), 5, request, &base("?page=4"));
        assert_eq!(result, Err(PaginationError::PageOutOfRange { page: 4 }));
    }

    #[rstest]
    fn envelope_serialises_with_expected_keys() {
        let page = Page::build(vec!["x"], 1, PageRequest::default(), &base("")).expect("page");
        let value = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            value,
            serde_json::json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": ["x"],
            })
        );
    }
}
