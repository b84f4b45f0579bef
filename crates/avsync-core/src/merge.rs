//! Reconciles freshly computed rollups with the persisted stats table.
//!
//! The table is the worksheet body (header excluded) as string cells in the
//! layout produced by [`RegionDayRollup::to_row`]. Rows are matched on
//! trimmed `(region, date)` string equality: a match is overwritten in place,
//! anything else is appended. Untouched rows keep their order.

use crate::aggregate::RegionRollupMap;
use crate::records::RegionDayRollup;

/// Header row of a profile's stats worksheet.
pub const STATS_HEADER: [&str; 5] = [
    "date",
    "region",
    "active_count",
    "unique_views",
    "unique_contacts",
];

/// Number of columns in a stats row.
pub const STATS_COLUMNS: u32 = 5;

/// Zero-based column of the date cell in a stats row.
const DATE_COL: usize = 0;
/// Zero-based column of the region cell in a stats row.
const REGION_COL: usize = 1;

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub updated: usize,
    pub appended: usize,
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", |c| c.trim())
}

/// Position of the row holding `rollup`'s `(region, date)` pair, if any.
fn find_row(rows: &[Vec<String>], rollup: &RegionDayRollup) -> Option<usize> {
    let region = rollup.region.trim();
    let date = rollup.date_key();
    rows.iter()
        .position(|row| cell(row, REGION_COL) == region && cell(row, DATE_COL) == date)
}

/// Merge `rollups` into `rows`, replacing on `(region, date)` match and
/// appending otherwise, in the map's iteration order.
///
/// Merging the same map twice leaves the table as after the first merge.
pub fn merge_rollups(rows: &mut Vec<Vec<String>>, rollups: &RegionRollupMap) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for rollup in rollups.values() {
        if let Some(idx) = find_row(rows, rollup) {
            rows[idx] = rollup.to_row();
            summary.updated += 1;
        } else {
            rows.push(rollup.to_row());
            summary.appended += 1;
        }
    }

    summary
}
