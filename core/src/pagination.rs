//! Client-side aggregation of paged list endpoints.
//!
//! # Design
//! The aggregator knows nothing about HTTP: it drives a `fetch` closure that
//! turns a [`PageRequest`] into a [`Page`], and decides when to stop. Two
//! stopping rules exist because the endpoints differ in how far their
//! reported `total` can be trusted:
//!
//! - [`Strategy::UntilTotal`] reads `total` from the pages and stops once
//!   that many items (counted from the start offset) have been collected.
//! - [`Strategy::UntilShortPage`] ignores `total` and stops at the first page
//!   holding fewer items than were asked for, an empty page included.
//!
//! Requests are strictly sequential. A failed fetch aborts the aggregation
//! and the items gathered so far are dropped.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::model::Page;

/// Page size used when a listing is aggregated without an explicit limit.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// When to stop asking for more pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Stop once `total` items are known. `page_size: None` leaves the page
    /// size to the server.
    UntilTotal { page_size: Option<u32> },
    /// Stop at the first page shorter than `page_size`.
    UntilShortPage { page_size: u32 },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::UntilShortPage {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Window asked of the server for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: Option<u32>,
}

/// Fetch every page from `start` onwards and concatenate their items.
pub fn collect_all<T, F>(strategy: Strategy, start: u64, fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageRequest) -> Result<Page<T>, ApiError>,
{
    match strategy {
        Strategy::UntilTotal { page_size } => until_total(start, page_size, fetch),
        Strategy::UntilShortPage { page_size } => until_short_page(start, page_size, fetch),
    }
}

fn until_total<T, F>(start: u64, page_size: Option<u32>, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageRequest) -> Result<Page<T>, ApiError>,
{
    let mut items = Vec::new();
    let mut requests = 0u32;
    loop {
        let offset = start + items.len() as u64;
        let page = fetch(PageRequest {
            offset,
            limit: page_size,
        })?;
        requests += 1;
        let received = page.items.len();
        let total = page.total;
        debug!(offset, received, total, "fetched page");
        items.extend(page.items);

        if start + items.len() as u64 >= total {
            break;
        }
        if received == 0 {
            warn!(
                collected = items.len(),
                total, "server reported more items than it returned, stopping"
            );
            break;
        }
    }
    debug!(requests, collected = items.len(), "aggregation complete");
    Ok(items)
}

fn until_short_page<T, F>(start: u64, page_size: u32, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageRequest) -> Result<Page<T>, ApiError>,
{
    if page_size == 0 {
        return Err(ApiError::InvalidArgument("page size must be positive".to_string()));
    }
    let mut items = Vec::new();
    let mut offset = start;
    let mut requests = 0u32;
    loop {
        let page = fetch(PageRequest {
            offset,
            limit: Some(page_size),
        })?;
        requests += 1;
        let received = page.items.len();
        debug!(offset, received, page_size, "fetched page");
        items.extend(page.items);
        offset += received as u64;

        if received < page_size as usize {
            break;
        }
    }
    debug!(requests, collected = items.len(), "aggregation complete");
    Ok(items)
}
