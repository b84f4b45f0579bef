//! Seller reviews and replies.
//!
//! The reviews endpoint pages by `offset`/`limit`; [`fetch_all_reviews`]
//! maps 1-indexed pages onto offsets so the shared empty-page pagination
//! applies unchanged.
//!
//! [`fetch_all_reviews`]: AvitoClient::fetch_all_reviews

use crate::client::AvitoClient;
use crate::error::AvitoError;
use crate::pagination::fetch_all_pages;
use crate::types::{AnswerRequest, AnswerResponse, Review, ReviewsPage};

/// Upstream maximum for `limit` on the reviews endpoint.
pub const REVIEWS_PAGE_LIMIT: u32 = 50;

/// Offset of a 1-indexed page.
fn page_offset(page: u32, limit: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(limit)
}

impl AvitoClient {
    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure or a failed response.
    pub async fn list_reviews(&self, offset: u32, limit: u32) -> Result<ReviewsPage, AvitoError> {
        let query = [
            ("offset", offset.to_string()),
            ("limit", limit.clamp(1, REVIEWS_PAGE_LIMIT).to_string()),
        ];
        self.get_json("ratings/v1/reviews", &query, "reviews page")
            .await
    }

    /// Fetches every review on the account.
    ///
    /// # Errors
    ///
    /// All-or-nothing; see [`fetch_all_pages`].
    pub async fn fetch_all_reviews(&self) -> Result<Vec<Review>, AvitoError> {
        fetch_all_pages("reviews", |page| async move {
            let body = self
                .list_reviews(page_offset(page, REVIEWS_PAGE_LIMIT), REVIEWS_PAGE_LIMIT)
                .await?;
            Ok(body.reviews)
        })
        .await
    }

    /// Posts `message` as the seller's reply to `review_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure or a failed response.
    pub async fn answer_review(
        &self,
        review_id: u64,
        message: &str,
    ) -> Result<AnswerResponse, AvitoError> {
        let body = AnswerRequest { review_id, message };
        self.post_json("ratings/v1/answers", &body, "review answer")
            .await
    }
}
