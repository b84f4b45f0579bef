//! The per-profile sync pipeline, run after a successful authentication.
//!
//! Steps, in order: account summary into the profile row, active ad listing,
//! per-ad details, chunked daily stats, regional aggregation, merge into the
//! profile's stats worksheet, then optional review replies. Any upstream or
//! spreadsheet error aborts the remaining steps for this profile.

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use avsync_api::{Account, AvitoClient, Balance, ItemStatus, ItemSummary, RatingInfo};
use avsync_core::profile::columns;
use avsync_core::{
    aggregate_by_region, build_ad_records, merge_rollups, AdDetail, AppConfig, DateRange,
    ItemDailyStats, MergeSummary, Profile, RegionRollups, DATE_FORMAT, STATS_COLUMNS,
    STATS_HEADER,
};
use avsync_sheets::{ensure_table, read_body, write_body, SheetStore};
use chrono::NaiveDate;

use crate::runner::{RowWriter, RunOptions};

/// What a successful profile sync did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProfileReport {
    pub account_id: u64,
    pub active_ads: usize,
    pub regions: usize,
    pub merge: MergeSummary,
    pub oldest_stat_date: Option<NaiveDate>,
    pub reviews_answered: u32,
}

pub(crate) async fn sync_profile<S>(
    store: &S,
    client: &AvitoClient,
    writer: &RowWriter<'_, S>,
    profile: &Profile,
    config: &AppConfig,
    options: &RunOptions,
) -> anyhow::Result<ProfileReport>
where
    S: SheetStore + ?Sized,
{
    let account = client
        .get_account_self()
        .await
        .context("failed to fetch account")?;
    let balance = client
        .get_balance(account.id)
        .await
        .context("failed to fetch balance")?;
    let rating = client
        .get_rating_info()
        .await
        .context("failed to fetch rating")?;
    let items = client
        .list_items(ItemStatus::Active, config.items_per_page)
        .await
        .context("failed to list active ads")?;

    writer
        .write(
            columns::ACCOUNT_NAME,
            account_cells(&account, &balance, &rating, items.len()),
        )
        .await
        .context("failed to write account fields")?;
    writer
        .write(columns::REVIEWS_COUNT, profile_cells(&account, &rating))
        .await
        .context("failed to write account fields")?;

    let rollups = compute_rollups(client, account.id, &items, config, options.run_date).await?;

    let merge = merge_into_worksheet(store, &profile.profile_id, &rollups, options.dry_run)
        .await
        .with_context(|| format!("failed to update stats worksheet '{}'", profile.profile_id))?;

    let reviews_answered = match config.review_reply_template.as_deref() {
        Some(template) if !options.skip_reviews => {
            answer_open_reviews(client, template, options.dry_run).await?
        }
        _ => 0,
    };

    Ok(ProfileReport {
        account_id: account.id,
        active_ads: items.len(),
        regions: rollups.rollups.len(),
        merge,
        oldest_stat_date: rollups.oldest_stat_date,
        reviews_answered,
    })
}

/// Cells F–I: account name, balance, active ad count, rating score.
fn account_cells(
    account: &Account,
    balance: &Balance,
    rating: &RatingInfo,
    active_ads: usize,
) -> Vec<String> {
    vec![
        account.name.clone(),
        balance.real.to_string(),
        active_ads.to_string(),
        rating
            .rating
            .as_ref()
            .map(|r| format!("{:.1}", r.score))
            .unwrap_or_default(),
    ]
}

/// Cells N–O: rating reviews count, public profile url.
fn profile_cells(account: &Account, rating: &RatingInfo) -> Vec<String> {
    vec![
        rating
            .rating
            .as_ref()
            .map(|r| r.reviews_count.to_string())
            .unwrap_or_default(),
        account.profile_url.clone().unwrap_or_default(),
    ]
}

async fn compute_rollups(
    client: &AvitoClient,
    user_id: u64,
    items: &[ItemSummary],
    config: &AppConfig,
    run_date: NaiveDate,
) -> anyhow::Result<RegionRollups> {
    let mut details: HashMap<u64, AdDetail> = HashMap::with_capacity(items.len());
    for item in items {
        let detail = client
            .get_item_detail(user_id, item.id)
            .await
            .with_context(|| format!("failed to fetch detail for ad {}", item.id))?;
        details.insert(item.id, detail.to_ad_detail(item));
    }

    let ids: Vec<u64> = items.iter().map(|item| item.id).collect();
    let range = DateRange::ending_on(run_date, config.stats_lookback_days);
    let mut stats = client
        .fetch_item_stats(user_id, &ids, config.stats_chunk_size, range)
        .await
        .context("failed to fetch ad statistics")?;
    include_silent_ads(&mut stats, &ids);

    let records = build_ad_records(&stats, &details);
    Ok(aggregate_by_region(&records, run_date))
}

/// Adds an empty entry for every listed ad the stats response left out, so
/// an active ad without traffic still counts toward its region.
fn include_silent_ads(stats: &mut Vec<ItemDailyStats>, ids: &[u64]) {
    let reported: HashSet<u64> = stats.iter().map(|s| s.item_id).collect();
    for &id in ids {
        if !reported.contains(&id) {
            stats.push(ItemDailyStats {
                item_id: id,
                points: Vec::new(),
            });
        }
    }
}

async fn merge_into_worksheet<S>(
    store: &S,
    worksheet: &str,
    rollups: &RegionRollups,
    dry_run: bool,
) -> anyhow::Result<MergeSummary>
where
    S: SheetStore + ?Sized,
{
    if dry_run {
        for rollup in rollups.rollups.values() {
            tracing::info!(
                worksheet,
                region = %rollup.region,
                date = %rollup.date.format(DATE_FORMAT),
                active_count = rollup.active_count,
                unique_views = rollup.unique_views,
                unique_contacts = rollup.unique_contacts,
                "dry-run: computed rollup"
            );
        }
        return Ok(MergeSummary::default());
    }

    ensure_table(store, worksheet, &STATS_HEADER).await?;
    let mut rows = read_body(store, worksheet, STATS_COLUMNS).await?;
    let summary = merge_rollups(&mut rows, &rollups.rollups);
    write_body(store, worksheet, &rows).await?;

    tracing::debug!(
        worksheet,
        updated = summary.updated,
        appended = summary.appended,
        total_rows = rows.len(),
        "merged rollups"
    );
    Ok(summary)
}

/// Replies to every review that accepts an answer and has none yet.
/// Individual reply failures are logged and skipped.
async fn answer_open_reviews(
    client: &AvitoClient,
    template: &str,
    dry_run: bool,
) -> anyhow::Result<u32> {
    let reviews = client
        .fetch_all_reviews()
        .await
        .context("failed to fetch reviews")?;

    let mut answered: u32 = 0;
    for review in reviews.iter().filter(|r| r.needs_answer()) {
        if dry_run {
            tracing::info!(review_id = review.id, "dry-run: would answer review");
            continue;
        }
        match client.answer_review(review.id, template).await {
            Ok(_) => answered += 1,
            Err(e) => tracing::warn!(
                review_id = review.id,
                error = %e,
                "failed to answer review; skipping"
            ),
        }
    }

    tracing::debug!(total = reviews.len(), answered, "processed reviews");
    Ok(answered)
}
