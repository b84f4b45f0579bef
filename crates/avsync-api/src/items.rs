use crate::client::AvitoClient;
use crate::error::AvitoError;
use crate::pagination::fetch_all_pages;
use crate::types::{ItemDetail, ItemStatus, ItemSummary, ItemsPage};

/// Upstream maximum for `per_page` on the listings endpoint.
pub const MAX_ITEMS_PER_PAGE: u32 = 100;

impl AvitoClient {
    /// Lists every ad with `status`, walking pages until the first empty one.
    ///
    /// # Errors
    ///
    /// All-or-nothing: a failing page aborts the listing; see
    /// [`fetch_all_pages`].
    pub async fn list_items(
        &self,
        status: ItemStatus,
        per_page: u32,
    ) -> Result<Vec<ItemSummary>, AvitoError> {
        let per_page = per_page.clamp(1, MAX_ITEMS_PER_PAGE);
        let items = fetch_all_pages("item listing", |page| {
            self.items_page(status, per_page, page)
        })
        .await?;

        tracing::debug!(status = status.as_str(), count = items.len(), "listed items");
        Ok(items)
    }

    /// Fetches one 1-indexed page of the ad listing.
    ///
    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure, a failed response or a
    /// body that does not match [`ItemsPage`].
    pub async fn items_page(
        &self,
        status: ItemStatus,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<ItemSummary>, AvitoError> {
        let query = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("status", status.as_str().to_owned()),
        ];
        let body: ItemsPage = self
            .get_json("core/v1/items", &query, "items page")
            .await?;
        Ok(body.resources)
    }

    /// Fetches the detail record for a single ad.
    ///
    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure or a failed response.
    pub async fn get_item_detail(
        &self,
        user_id: u64,
        item_id: u64,
    ) -> Result<ItemDetail, AvitoError> {
        self.get_json(
            &format!("core/v1/accounts/{user_id}/items/{item_id}/"),
            &[],
            "item detail",
        )
        .await
    }
}
