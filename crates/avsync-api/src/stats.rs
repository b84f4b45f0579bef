//! Chunked statistics queries.
//!
//! The stats endpoint accepts a bounded number of item ids per request. An
//! id list is split into consecutive chunks of at most `chunk_size`, one
//! request is sent per chunk, strictly in order, and the per-chunk `items`
//! are concatenated in chunk order. Pacing between requests comes from the
//! client's token bucket.

use std::future::Future;

use avsync_core::{DateRange, ItemDailyStats, DATE_FORMAT};

use crate::client::AvitoClient;
use crate::error::AvitoError;
use crate::types::{StatsRequest, StatsResponse};

/// Counters requested from the stats endpoint.
pub const STAT_FIELDS: [&str; 2] = ["uniqViews", "uniqContacts"];

/// Upstream limit on item ids per stats request.
pub const MAX_STATS_CHUNK: usize = 200;

/// Splits `ids` into consecutive chunks of at most `chunk_size` ids.
///
/// The last chunk may be shorter. An empty list yields an empty plan; a zero
/// `chunk_size` is treated as 1.
#[must_use]
pub fn chunk_plan(ids: &[u64], chunk_size: usize) -> Vec<&[u64]> {
    ids.chunks(chunk_size.max(1)).collect()
}

/// Runs `fetch` once per chunk of `ids` and concatenates the results.
///
/// # Errors
///
/// The first failing chunk aborts the batch; its error is returned and no
/// later chunk is requested.
pub async fn fetch_chunked<'a, T, F, Fut>(
    ids: &'a [u64],
    chunk_size: usize,
    mut fetch: F,
) -> Result<Vec<T>, AvitoError>
where
    F: FnMut(&'a [u64]) -> Fut,
    Fut: Future<Output = Result<Vec<T>, AvitoError>>,
{
    let plan = chunk_plan(ids, chunk_size);
    let chunks = plan.len();
    let mut results: Vec<T> = Vec::new();

    for (idx, chunk) in plan.into_iter().enumerate() {
        let items = fetch(chunk).await?;
        tracing::debug!(
            chunk = idx + 1,
            chunks,
            ids = chunk.len(),
            items = items.len(),
            "fetched stats chunk"
        );
        results.extend(items);
    }

    Ok(results)
}

impl AvitoClient {
    /// Fetches daily `uniqViews` / `uniqContacts` for every id in `item_ids`
    /// over `range`, in chunks of at most `chunk_size` ids.
    ///
    /// `chunk_size` is clamped to [`MAX_STATS_CHUNK`].
    ///
    /// # Errors
    ///
    /// Any failing chunk aborts the whole query; see [`fetch_chunked`].
    pub async fn fetch_item_stats(
        &self,
        user_id: u64,
        item_ids: &[u64],
        chunk_size: usize,
        range: DateRange,
    ) -> Result<Vec<ItemDailyStats>, AvitoError> {
        let chunk_size = chunk_size.min(MAX_STATS_CHUNK);
        fetch_chunked(item_ids, chunk_size, |chunk| {
            self.stats_chunk(user_id, chunk, range)
        })
        .await
    }

    async fn stats_chunk(
        &self,
        user_id: u64,
        chunk: &[u64],
        range: DateRange,
    ) -> Result<Vec<ItemDailyStats>, AvitoError> {
        let request = StatsRequest {
            date_from: range.from.format(DATE_FORMAT).to_string(),
            date_to: range.to.format(DATE_FORMAT).to_string(),
            fields: &STAT_FIELDS,
            item_ids: chunk,
            period_grouping: "day",
        };
        let response: StatsResponse = self
            .post_json(
                &format!("stats/v1/accounts/{user_id}/items"),
                &request,
                "item statistics",
            )
            .await?;
        Ok(response
            .result
            .items
            .into_iter()
            .map(ItemDailyStats::from)
            .collect())
    }
}
