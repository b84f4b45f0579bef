//! Typed records flowing through the statistics pipeline.
//!
//! Upstream wire types live in `avsync-api`; these are the shapes the
//! aggregation and merge steps operate on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item status string the upstream uses for a published, visible ad.
pub const ACTIVE_STATUS: &str = "active";

/// Region assigned when an ad's detail carries no usable location.
pub const UNKNOWN_REGION: &str = "unknown";

/// Date format used for every date cell written to the spreadsheet.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range for a statistics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Range ending on `today` and starting `lookback_days` earlier.
    #[must_use]
    pub fn ending_on(today: NaiveDate, lookback_days: u32) -> Self {
        let from = today
            .checked_sub_days(chrono::Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }
}

/// One day of counters for a single ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub unique_views: u64,
    pub unique_contacts: u64,
}

/// Raw per-ad statistics as returned by one entry of a stats response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDailyStats {
    pub item_id: u64,
    pub points: Vec<DailyPoint>,
}

/// Region and publication status resolved from an ad's detail lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdDetail {
    pub region: String,
    pub status: String,
}

impl AdDetail {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ACTIVE_STATUS)
    }
}

/// One ad's statistics joined with its detail, summed over the queried range.
///
/// `date` is the earliest day with a stat point, `None` when the ad had no
/// points in the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdStatRecord {
    pub ad_id: u64,
    pub region: String,
    pub date: Option<NaiveDate>,
    pub unique_views: u64,
    pub unique_contacts: u64,
    pub active: bool,
}

/// Aggregated totals for one (region, date) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDayRollup {
    pub region: String,
    pub date: NaiveDate,
    pub active_count: u32,
    pub unique_views: u64,
    pub unique_contacts: u64,
}

impl RegionDayRollup {
    /// Spreadsheet row: `date | region | active_count | unique_views | unique_contacts`.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            self.region.clone(),
            self.active_count.to_string(),
            self.unique_views.to_string(),
            self.unique_contacts.to_string(),
        ]
    }

    /// Date as it is written to, and compared against, the persisted table.
    #[must_use]
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
