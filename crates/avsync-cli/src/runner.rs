//! Profile batch orchestration.
//!
//! Profiles are processed one at a time in row order. Every profile ends in a
//! [`ProfileOutcome`]; the outcome is written back to the profile's row and
//! the run moves on, unless `halt_on_failure` is set and the outcome is
//! `Failed`. Status marker writes are best-effort: a failed write is logged
//! and never changes the outcome. Blocked profiles are reported through their
//! marker and never fail the run.

use anyhow::Context;
use avsync_api::{AvitoClient, AvitoError, ClientSettings, Credentials};
use avsync_core::profile::columns;
use avsync_core::{AppConfig, Profile, ProfileStatus, RowError, DATE_FORMAT};
use avsync_sheets::{read_body, CellRef, SheetError, SheetStore, FIRST_DATA_ROW};
use chrono::NaiveDate;

use crate::pipeline::{self, ProfileReport};

/// Per-invocation switches for a sync run.
#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    /// Only process the profile whose id or label equals this value.
    pub profile_filter: Option<String>,
    pub skip_reviews: bool,
    pub dry_run: bool,
    pub halt_on_failure: bool,
    /// Date stamped on every rollup computed by this run.
    pub run_date: NaiveDate,
}

/// How a single profile row ended.
#[derive(Debug)]
pub(crate) enum ProfileOutcome {
    Success(ProfileReport),
    /// Credentials were rejected.
    Blocked(String),
    Failed(String),
}

impl ProfileOutcome {
    fn label(&self) -> &'static str {
        match self {
            ProfileOutcome::Success(_) => "success",
            ProfileOutcome::Blocked(_) => "blocked",
            ProfileOutcome::Failed(_) => "failed",
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub succeeded: usize,
    pub blocked: usize,
    pub failed: usize,
}

impl RunSummary {
    pub(crate) fn processed(&self) -> usize {
        self.succeeded + self.blocked + self.failed
    }

    fn record(&mut self, outcome: &ProfileOutcome) {
        match outcome {
            ProfileOutcome::Success(_) => self.succeeded += 1,
            ProfileOutcome::Blocked(_) => self.blocked += 1,
            ProfileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// A non-blank row of the profiles worksheet.
#[derive(Debug)]
pub(crate) struct ProfileRow {
    pub row: u32,
    pub parsed: Result<Profile, RowError>,
}

impl ProfileRow {
    fn matches(&self, filter: &str) -> bool {
        match &self.parsed {
            Ok(profile) => profile.profile_id == filter || profile.label == filter,
            Err(_) => false,
        }
    }
}

/// Parses worksheet body rows (row 2 onwards), dropping rows with a blank label.
pub(crate) fn parse_profile_rows(rows: &[Vec<String>]) -> Vec<ProfileRow> {
    rows.iter()
        .zip(FIRST_DATA_ROW..)
        .filter_map(|(cells, row)| match Profile::from_row(row, cells) {
            Ok(Some(profile)) => Some(ProfileRow {
                row,
                parsed: Ok(profile),
            }),
            Ok(None) => None,
            Err(e) => Some(ProfileRow {
                row,
                parsed: Err(e),
            }),
        })
        .collect()
}

/// Reads and parses every profile row of `worksheet`.
pub(crate) async fn load_profile_rows<S>(store: &S, worksheet: &str) -> anyhow::Result<Vec<ProfileRow>>
where
    S: SheetStore + ?Sized,
{
    let rows = read_body(store, worksheet, columns::WIDTH)
        .await
        .with_context(|| format!("failed to read profiles worksheet '{worksheet}'"))?;
    Ok(parse_profile_rows(&rows))
}

/// Writes cells of one profile row, or only logs them on a dry run.
pub(crate) struct RowWriter<'a, S: ?Sized> {
    store: &'a S,
    worksheet: &'a str,
    row: u32,
    dry_run: bool,
}

impl<'a, S> RowWriter<'a, S>
where
    S: SheetStore + ?Sized,
{
    pub(crate) fn new(store: &'a S, worksheet: &'a str, row: u32, dry_run: bool) -> Self {
        Self {
            store,
            worksheet,
            row,
            dry_run,
        }
    }

    /// Writes `values` into consecutive cells starting at column `col`.
    pub(crate) async fn write(&self, col: u32, values: Vec<String>) -> Result<(), SheetError> {
        if self.dry_run {
            tracing::info!(row = self.row, col, ?values, "dry-run: skipping profile row write");
            return Ok(());
        }
        self.store
            .set_values(self.worksheet, CellRef::new(self.row, col), &[values])
            .await
    }

    /// Writes a single cell, logging instead of failing.
    pub(crate) async fn write_cell_best_effort(&self, col: u32, value: &str, what: &str) {
        if self.dry_run {
            tracing::info!(row = self.row, col, value, "dry-run: skipping profile row write");
            return;
        }
        let cell = CellRef::new(self.row, col);
        if let Err(e) = self.store.set_value(self.worksheet, cell, value).await {
            tracing::warn!(row = self.row, error = %e, "failed to write {what}");
        }
    }

    pub(crate) async fn write_best_effort(&self, col: u32, values: Vec<String>, what: &str) {
        if let Err(e) = self.write(col, values).await {
            tracing::warn!(row = self.row, error = %e, "failed to write {what}");
        }
    }
}

/// Runs every selected profile row and writes each outcome back.
///
/// # Errors
///
/// Returns an error when the profiles worksheet cannot be read, when a
/// `--profile` filter matches nothing, when a `Failed` outcome occurs with
/// `halt_on_failure` set, or when some profile failed and none succeeded.
/// Blocked profiles never fail the run. Per-profile failures are otherwise
/// recorded and skipped.
pub(crate) async fn run_profiles<S>(
    store: &S,
    config: &AppConfig,
    settings: &ClientSettings,
    options: &RunOptions,
) -> anyhow::Result<RunSummary>
where
    S: SheetStore + ?Sized,
{
    let rows = load_profile_rows(store, &config.profiles_worksheet).await?;
    let selected: Vec<&ProfileRow> = match options.profile_filter.as_deref() {
        Some(filter) => rows.iter().filter(|r| r.matches(filter)).collect(),
        None => rows.iter().collect(),
    };

    if let Some(filter) = options.profile_filter.as_deref() {
        if selected.is_empty() {
            anyhow::bail!(
                "profile '{filter}' not found in worksheet '{}'",
                config.profiles_worksheet
            );
        }
    }

    tracing::info!(
        profiles = selected.len(),
        dry_run = options.dry_run,
        "starting sync run"
    );

    let mut summary = RunSummary::default();

    for profile_row in selected {
        let writer = RowWriter::new(
            store,
            &config.profiles_worksheet,
            profile_row.row,
            options.dry_run,
        );

        let outcome = match &profile_row.parsed {
            Ok(profile) => process_profile(store, &writer, config, settings, options, profile).await,
            Err(e) => ProfileOutcome::Failed(e.to_string()),
        };

        log_outcome(profile_row, &outcome);
        record_outcome(&writer, &outcome).await;
        summary.record(&outcome);

        if let ProfileOutcome::Failed(reason) = &outcome {
            if options.halt_on_failure {
                anyhow::bail!(
                    "halting run: profile row {} failed: {reason}",
                    profile_row.row
                );
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        blocked = summary.blocked,
        failed = summary.failed,
        "sync run finished"
    );

    if summary.failed > 0 && summary.succeeded == 0 {
        anyhow::bail!(
            "no profile succeeded ({} failed, {} blocked)",
            summary.failed,
            summary.blocked
        );
    }

    Ok(summary)
}

async fn process_profile<S>(
    store: &S,
    writer: &RowWriter<'_, S>,
    config: &AppConfig,
    settings: &ClientSettings,
    options: &RunOptions,
    profile: &Profile,
) -> ProfileOutcome
where
    S: SheetStore + ?Sized,
{
    let credentials = Credentials::new(&profile.client_id, &profile.client_secret);
    let client = match AvitoClient::authenticate(settings, &credentials).await {
        Ok(client) => client,
        Err(AvitoError::Auth(reason)) => return ProfileOutcome::Blocked(reason),
        Err(e) => return ProfileOutcome::Failed(format!("authentication request failed: {e}")),
    };

    writer
        .write_cell_best_effort(
            columns::STATUS,
            ProfileStatus::Active.marker(),
            "status marker",
        )
        .await;

    match pipeline::sync_profile(store, &client, writer, profile, config, options).await {
        Ok(report) => ProfileOutcome::Success(report),
        Err(e) => ProfileOutcome::Failed(format!("{e:#}")),
    }
}

fn log_outcome(profile_row: &ProfileRow, outcome: &ProfileOutcome) {
    let profile = profile_row
        .parsed
        .as_ref()
        .map_or("<invalid row>", |p| p.profile_id.as_str());
    match outcome {
        ProfileOutcome::Success(report) => tracing::info!(
            row = profile_row.row,
            profile,
            account_id = report.account_id,
            active_ads = report.active_ads,
            regions = report.regions,
            rows_updated = report.merge.updated,
            rows_appended = report.merge.appended,
            reviews_answered = report.reviews_answered,
            "profile synced"
        ),
        ProfileOutcome::Blocked(reason) => tracing::warn!(
            row = profile_row.row,
            profile,
            reason = %reason,
            "profile credentials rejected; marking blocked"
        ),
        ProfileOutcome::Failed(reason) => tracing::error!(
            row = profile_row.row,
            profile,
            outcome = outcome.label(),
            error = %reason,
            "profile sync failed"
        ),
    }
}

/// Writes the outcome into the profile row: status marker for a block, the
/// reason into the error column, and counters plus a timestamp on success.
async fn record_outcome<S>(writer: &RowWriter<'_, S>, outcome: &ProfileOutcome)
where
    S: SheetStore + ?Sized,
{
    match outcome {
        ProfileOutcome::Success(report) => {
            let synced_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
            let oldest = report
                .oldest_stat_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default();
            writer
                .write_best_effort(
                    columns::ERROR,
                    vec![
                        String::new(),
                        report.reviews_answered.to_string(),
                        oldest,
                        synced_at,
                    ],
                    "sync summary",
                )
                .await;
        }
        ProfileOutcome::Blocked(reason) => {
            writer
                .write_cell_best_effort(
                    columns::STATUS,
                    ProfileStatus::Blocked.marker(),
                    "status marker",
                )
                .await;
            writer
                .write_cell_best_effort(columns::ERROR, reason, "error reason")
                .await;
        }
        ProfileOutcome::Failed(reason) => {
            writer
                .write_cell_best_effort(columns::ERROR, reason, "error reason")
                .await;
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
