//! Per-region daily rollups built from raw per-ad statistics.
//!
//! The rollup date is the run date, not a date taken from the stat points:
//! a row means "as observed on this run". The earliest stat date across all
//! ads is reported separately and never used as a key.

use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::records::{AdDetail, AdStatRecord, ItemDailyStats, RegionDayRollup, UNKNOWN_REGION};

/// Rollups keyed by region in first-encounter order.
pub type RegionRollupMap = IndexMap<String, RegionDayRollup>;

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRollups {
    pub rollups: RegionRollupMap,
    /// Earliest stat point date seen across all ads, if any ad had points.
    pub oldest_stat_date: Option<NaiveDate>,
}

/// Join raw stat entries with their ad details into per-ad records.
///
/// An entry whose ad has no detail is kept under [`UNKNOWN_REGION`] and
/// counted as inactive, so its views still reach a rollup.
#[must_use]
pub fn build_ad_records(
    stats: &[ItemDailyStats],
    details: &HashMap<u64, AdDetail>,
) -> Vec<AdStatRecord> {
    stats
        .iter()
        .map(|entry| {
            let (region, active) = match details.get(&entry.item_id) {
                Some(detail) => (detail.region.trim().to_string(), detail.is_active()),
                None => {
                    tracing::warn!(
                        item_id = entry.item_id,
                        "no detail for ad with statistics; counting under unknown region"
                    );
                    (UNKNOWN_REGION.to_string(), false)
                }
            };

            AdStatRecord {
                ad_id: entry.item_id,
                region,
                date: entry.points.iter().map(|p| p.date).min(),
                unique_views: entry.points.iter().map(|p| p.unique_views).sum(),
                unique_contacts: entry.points.iter().map(|p| p.unique_contacts).sum(),
                active,
            }
        })
        .collect()
}

/// Fold per-ad records into one rollup per region, dated `run_date`.
///
/// Ads without stat points add nothing to the view and contact sums but are
/// still counted in `active_count` when active.
#[must_use]
pub fn aggregate_by_region(records: &[AdStatRecord], run_date: NaiveDate) -> RegionRollups {
    let mut rollups = RegionRollupMap::new();
    let mut oldest_stat_date: Option<NaiveDate> = None;

    for record in records {
        let rollup = rollups
            .entry(record.region.clone())
            .or_insert_with(|| RegionDayRollup {
                region: record.region.clone(),
                date: run_date,
                active_count: 0,
                unique_views: 0,
                unique_contacts: 0,
            });

        rollup.unique_views = rollup.unique_views.saturating_add(record.unique_views);
        rollup.unique_contacts = rollup.unique_contacts.saturating_add(record.unique_contacts);
        if record.active {
            rollup.active_count = rollup.active_count.saturating_add(1);
        }

        if let Some(date) = record.date {
            oldest_stat_date = Some(oldest_stat_date.map_or(date, |d| d.min(date)));
        }
    }

    RegionRollups {
        rollups,
        oldest_stat_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DailyPoint;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn point(day: &str, views: u64, contacts: u64) -> DailyPoint {
        DailyPoint {
            date: date(day),
            unique_views: views,
            unique_contacts: contacts,
        }
    }

    fn detail(region: &str, status: &str) -> AdDetail {
        AdDetail {
            region: region.to_string(),
            status: status.to_string(),
        }
    }

    fn run(stats: &[ItemDailyStats], details: &HashMap<u64, AdDetail>) -> RegionRollups {
        aggregate_by_region(&build_ad_records(stats, details), date("2024-05-20"))
    }

    #[test]
    fn sums_views_across_ads_in_same_region() {
        let stats = vec![
            ItemDailyStats {
                item_id: 1,
                points: vec![point("2024-05-18", 3, 1), point("2024-05-19", 5, 0)],
            },
            ItemDailyStats {
                item_id: 2,
                points: vec![point("2024-05-19", 2, 2)],
            },
        ];
        let details = HashMap::from([
            (1, detail("Moscow", "active")),
            (2, detail("Moscow", "active")),
        ]);

        let result = run(&stats, &details);
        let moscow = &result.rollups["Moscow"];
        assert_eq!(moscow.unique_views, 10);
        assert_eq!(moscow.unique_contacts, 3);
        assert_eq!(moscow.active_count, 2);
        assert_eq!(moscow.date, date("2024-05-20"));
    }

    #[test]
    fn active_count_only_counts_active_status() {
        let stats = vec![
            ItemDailyStats {
                item_id: 1,
                points: vec![point("2024-05-19", 1, 0)],
            },
            ItemDailyStats {
                item_id: 2,
                points: vec![point("2024-05-19", 4, 0)],
            },
        ];
        let details = HashMap::from([
            (1, detail("Kazan", "active")),
            (2, detail("Kazan", "old")),
        ]);

        let result = run(&stats, &details);
        let kazan = &result.rollups["Kazan"];
        assert_eq!(kazan.active_count, 1);
        assert_eq!(kazan.unique_views, 5);
    }

    #[test]
    fn ad_without_points_still_counts_as_active() {
        let stats = vec![ItemDailyStats {
            item_id: 7,
            points: vec![],
        }];
        let details = HashMap::from([(7, detail("Omsk", "active"))]);

        let result = run(&stats, &details);
        let omsk = &result.rollups["Omsk"];
        assert_eq!(omsk.active_count, 1);
        assert_eq!(omsk.unique_views, 0);
        assert_eq!(omsk.unique_contacts, 0);
        assert_eq!(result.oldest_stat_date, None);
    }

    #[test]
    fn regions_keep_first_encounter_order() {
        let stats: Vec<ItemDailyStats> = [3, 1, 2, 4]
            .into_iter()
            .map(|id| ItemDailyStats {
                item_id: id,
                points: vec![],
            })
            .collect();
        let details = HashMap::from([
            (3, detail("Tver", "active")),
            (1, detail("Moscow", "active")),
            (2, detail("Tver", "active")),
            (4, detail("Perm", "active")),
        ]);

        let result = run(&stats, &details);
        let order: Vec<&str> = result.rollups.keys().map(String::as_str).collect();
        assert_eq!(order, ["Tver", "Moscow", "Perm"]);
    }

    #[test]
    fn oldest_stat_date_is_minimum_across_ads() {
        let stats = vec![
            ItemDailyStats {
                item_id: 1,
                points: vec![point("2024-05-10", 1, 0), point("2024-05-12", 1, 0)],
            },
            ItemDailyStats {
                item_id: 2,
                points: vec![point("2024-05-03", 1, 0)],
            },
        ];
        let details = HashMap::from([
            (1, detail("Moscow", "active")),
            (2, detail("Sochi", "active")),
        ]);

        assert_eq!(run(&stats, &details).oldest_stat_date, Some(date("2024-05-03")));
    }

    #[test]
    fn missing_detail_lands_in_unknown_region_as_inactive() {
        let stats = vec![ItemDailyStats {
            item_id: 9,
            points: vec![point("2024-05-19", 6, 1)],
        }];

        let result = run(&stats, &HashMap::new());
        let unknown = &result.rollups[UNKNOWN_REGION];
        assert_eq!(unknown.unique_views, 6);
        assert_eq!(unknown.active_count, 0);
    }

    #[test]
    fn region_names_are_trimmed_before_grouping() {
        let stats = vec![
            ItemDailyStats {
                item_id: 1,
                points: vec![],
            },
            ItemDailyStats {
                item_id: 2,
                points: vec![],
            },
        ];
        let details = HashMap::from([
            (1, detail("Moscow ", "active")),
            (2, detail(" Moscow", "active")),
        ]);

        let result = run(&stats, &details);
        assert_eq!(result.rollups.len(), 1);
        assert_eq!(result.rollups["Moscow"].active_count, 2);
    }

    #[test]
    fn empty_input_yields_no_rollups() {
        let result = run(&[], &HashMap::new());
        assert!(result.rollups.is_empty());
        assert!(result.oldest_stat_date.is_none());
    }
}
