//! Client for the Avito seller REST API.
//!
//! Covers the endpoints the sync job needs: client-credentials tokens,
//! account summary, ad listings and details, chunked daily statistics,
//! ratings and review replies. Every request goes through one paced,
//! retrying transport.

mod account;
pub mod auth;
pub mod client;
pub mod error;
mod items;
pub mod pagination;
pub mod rate_limit;
mod retry;
mod reviews;
pub mod stats;
pub mod types;

pub use auth::{Credentials, Session};
pub use client::{AvitoClient, ClientSettings};
pub use error::AvitoError;
pub use items::MAX_ITEMS_PER_PAGE;
pub use pagination::{fetch_all_pages, MAX_PAGES};
pub use rate_limit::RequestPacer;
pub use reviews::REVIEWS_PAGE_LIMIT;
pub use stats::{chunk_plan, fetch_chunked, MAX_STATS_CHUNK, STAT_FIELDS};
pub use types::{
    Account, AnswerResponse, Balance, ItemDetail, ItemStatus, ItemSummary, Rating, RatingInfo,
    Review,
};
