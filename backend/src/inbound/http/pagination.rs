//! Page-number query parameters and the response envelope for list
//! endpoints.

use actix_web::HttpRequest;
use pagination::{Page, PageRequest, PaginationError};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::Listing;

use super::state::HttpState;

/// `?page=&page_size=` parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Items per page, at most 100; defaults to the configured size.
    pub page_size: Option<u32>,
}

/// `?search=` substring filter accepted by user and taxonomy listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring to match.
    pub search: Option<String>,
}

impl PageQuery {
    /// Validate against the configured default page size.
    pub fn request(self, state: &HttpState) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page, self.page_size, state.page_size)
            .map_err(map_pagination_error)
    }
}

fn map_pagination_error(err: PaginationError) -> Error {
    match err {
        PaginationError::InvalidPage => Error::field("page", err.to_string()),
        PaginationError::InvalidPageSize { .. } => Error::field("page_size", err.to_string()),
        PaginationError::PageOutOfRange { .. } => Error::not_found(err.to_string()),
    }
}

/// Wrap one page of `listing` in the `{count, next, previous, results}`
/// envelope, with links derived from the request URL.
pub fn envelope<T, U>(
    req: &HttpRequest,
    listing: Listing<T>,
    request: PageRequest,
    present: impl FnMut(T) -> U,
) -> Result<Page<U>, Error> {
    let url = req.full_url();
    Page::build(listing.items, listing.total, request, &url)
        .map(|page| page.map(present))
        .map_err(map_pagination_error)
}
