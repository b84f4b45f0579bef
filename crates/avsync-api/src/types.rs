//! Avito API response and request types.
//!
//! Only the fields the sync job reads are modelled; unknown fields are
//! ignored. Optional fields default so that sparse accounts (no ratings, no
//! address on an ad) still deserialize.

use avsync_core::{AdDetail, DailyPoint, ItemDailyStats, UNKNOWN_REGION};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// `POST /token` response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// `GET /core/v1/accounts/self`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// `GET /core/v1/accounts/{user_id}/balance/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub real: Decimal,
}

/// `GET /ratings/v1/info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingInfo {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub score: f64,
    #[serde(default)]
    pub reviews_count: u32,
}

/// Listing status filter for `GET /core/v1/items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Active,
    Removed,
    Old,
    Blocked,
    Rejected,
}

impl ItemStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Removed => "removed",
            ItemStatus::Old => "old",
            ItemStatus::Blocked => "blocked",
            ItemStatus::Rejected => "rejected",
        }
    }
}

/// One page of `GET /core/v1/items`. An empty `resources` list ends pagination.
#[derive(Debug, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub resources: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSummary {
    pub id: u64,
    /// Ad location; the detail endpoint usually carries none.
    #[serde(default)]
    pub address: Option<String>,
}

/// `GET /core/v1/accounts/{user_id}/items/{item_id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDetail {
    pub status: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn address_region(address: Option<&str>) -> Option<&str> {
    non_blank(address.and_then(|a| a.split(',').next()))
}

impl ItemDetail {
    /// Region of the ad, first match wins: the detail's region field, the
    /// first comma-separated segment of the detail address, the same segment
    /// of the listing address, then [`UNKNOWN_REGION`].
    #[must_use]
    pub fn resolved_region(&self, listing_address: Option<&str>) -> String {
        non_blank(self.region.as_deref())
            .or_else(|| address_region(self.address.as_deref()))
            .or_else(|| address_region(listing_address))
            .unwrap_or(UNKNOWN_REGION)
            .to_string()
    }

    /// Joins this detail with the listing entry of the same ad.
    #[must_use]
    pub fn to_ad_detail(&self, summary: &ItemSummary) -> AdDetail {
        AdDetail {
            region: self.resolved_region(summary.address.as_deref()),
            status: self.status.clone(),
        }
    }
}

/// Body of `POST /stats/v1/accounts/{user_id}/items`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest<'a> {
    pub date_from: String,
    pub date_to: String,
    pub fields: &'a [&'a str],
    pub item_ids: &'a [u64],
    pub period_grouping: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    pub result: StatsResult,
}

#[derive(Debug, Deserialize)]
pub struct StatsResult {
    #[serde(default)]
    pub items: Vec<ItemStatsEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatsEntry {
    pub item_id: u64,
    #[serde(default)]
    pub stats: Vec<DailyStatEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub uniq_views: u64,
    #[serde(default)]
    pub uniq_contacts: u64,
}

impl From<ItemStatsEntry> for ItemDailyStats {
    fn from(entry: ItemStatsEntry) -> Self {
        ItemDailyStats {
            item_id: entry.item_id,
            points: entry
                .stats
                .into_iter()
                .map(|s| DailyPoint {
                    date: s.date,
                    unique_views: s.uniq_views,
                    unique_contacts: s.uniq_contacts,
                })
                .collect(),
        }
    }
}

/// One page of `GET /ratings/v1/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewsPage {
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub can_answer: bool,
    /// Existing seller reply; only its presence matters.
    #[serde(default)]
    pub answer: Option<IgnoredAny>,
}

impl Review {
    /// Whether the seller may still post a reply to this review.
    #[must_use]
    pub fn needs_answer(&self) -> bool {
        self.can_answer && self.answer.is_none()
    }
}

/// Body of `POST /ratings/v1/answers`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest<'a> {
    pub review_id: u64,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(region: Option<&str>, address: Option<&str>) -> ItemDetail {
        ItemDetail {
            status: "active".to_owned(),
            region: region.map(str::to_owned),
            address: address.map(str::to_owned),
        }
    }

    #[test]
    fn explicit_region_wins() {
        let d = detail(Some(" Moscow "), Some("Kazan, Baumana 1"));
        assert_eq!(d.resolved_region(Some("Omsk, Lenina 1")), "Moscow");
    }

    #[test]
    fn region_falls_back_to_first_address_segment() {
        let d = detail(None, Some("Kazan, Baumana 1"));
        assert_eq!(d.resolved_region(Some("Omsk, Lenina 1")), "Kazan");
    }

    #[test]
    fn region_falls_back_to_listing_address() {
        let d = detail(None, None);
        assert_eq!(d.resolved_region(Some(" Omsk , Lenina 1")), "Omsk");
    }

    #[test]
    fn region_falls_back_to_unknown() {
        assert_eq!(detail(Some("  "), None).resolved_region(None), UNKNOWN_REGION);
        assert_eq!(detail(None, None).resolved_region(Some(", x")), UNKNOWN_REGION);
    }

    #[test]
    fn ad_detail_takes_status_from_detail_and_region_from_listing() {
        let summary: ItemSummary = serde_json::from_value(serde_json::json!({
            "id": 101,
            "title": "Sofa",
            "address": "Moscow, Tverskaya 1"
        }))
        .unwrap();
        let d: ItemDetail = serde_json::from_value(serde_json::json!({
            "status": "active",
            "url": "https://www.avito.ru/101",
            "start_time": "2024-01-01T00:00:00Z",
            "vas": []
        }))
        .unwrap();

        let ad = d.to_ad_detail(&summary);
        assert_eq!(ad.region, "Moscow");
        assert_eq!(ad.status, "active");
    }

    #[test]
    fn stats_entry_converts_into_core_record() {
        let entry: ItemStatsEntry = serde_json::from_value(serde_json::json!({
            "itemId": 11,
            "stats": [
                {"date": "2024-01-01", "uniqViews": 3, "uniqContacts": 1},
                {"date": "2024-01-02", "uniqViews": 5}
            ]
        }))
        .unwrap();
        let stats = ItemDailyStats::from(entry);
        assert_eq!(stats.item_id, 11);
        assert_eq!(stats.points.len(), 2);
        assert_eq!(stats.points[1].unique_views, 5);
        assert_eq!(stats.points[1].unique_contacts, 0);
    }

    #[test]
    fn review_with_answer_does_not_need_one() {
        let review: Review = serde_json::from_value(serde_json::json!({
            "id": 1,
            "canAnswer": true,
            "answer": {"id": 9, "text": "thanks"}
        }))
        .unwrap();
        assert!(!review.needs_answer());

        let open: Review =
            serde_json::from_value(serde_json::json!({"id": 2, "canAnswer": true})).unwrap();
        assert!(open.needs_answer());
    }

    #[test]
    fn stats_request_uses_camel_case_keys() {
        let body = StatsRequest {
            date_from: "2024-01-01".to_owned(),
            date_to: "2024-01-02".to_owned(),
            fields: &["uniqViews"],
            item_ids: &[1, 2],
            period_grouping: "day",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["dateFrom"], "2024-01-01");
        assert_eq!(json["itemIds"], serde_json::json!([1, 2]));
        assert_eq!(json["periodGrouping"], "day");
    }
}
