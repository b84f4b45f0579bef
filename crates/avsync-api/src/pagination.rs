//! Page-number pagination.
//!
//! The upstream signals the end of a listing with an empty page. Callers
//! supply a `fetch(page)` closure with 1-indexed pages; [`fetch_all_pages`]
//! keeps requesting until the first empty page and returns everything
//! collected, in page order.

use std::future::Future;

use crate::error::AvitoError;

/// Maximum number of pages to request before returning an error.
/// Guards against an upstream that never returns an empty page.
pub const MAX_PAGES: u32 = 1_000;

/// Fetches pages `1, 2, …` until one comes back empty and concatenates them.
///
/// **All-or-nothing semantics**: if any page fails, items from earlier pages
/// are discarded and the error is returned. A partial ad list would silently
/// under-count every downstream rollup.
///
/// The empty terminating page is requested exactly once.
///
/// # Errors
///
/// Propagates the first error returned by `fetch`, or
/// [`AvitoError::PaginationLimit`] after [`MAX_PAGES`] non-empty pages.
pub async fn fetch_all_pages<T, F, Fut>(context: &str, mut fetch: F) -> Result<Vec<T>, AvitoError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, AvitoError>>,
{
    let mut items: Vec<T> = Vec::new();

    for page in 1..=MAX_PAGES {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            tracing::debug!(
                context,
                pages = page - 1,
                items = items.len(),
                "pagination complete"
            );
            return Ok(items);
        }
        tracing::debug!(context, page, count = batch.len(), "fetched page");
        items.extend(batch);
    }

    Err(AvitoError::PaginationLimit {
        context: context.to_owned(),
        max_pages: MAX_PAGES,
    })
}
