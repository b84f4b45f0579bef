use anyhow::Context;
use avsync_api::ClientSettings;
use avsync_core::AppConfig;
use avsync_sheets::GoogleSheetsClient;

use crate::runner::{self, RunOptions};

/// Builds the Google Sheets store for the configured spreadsheet.
pub(crate) fn build_store(config: &AppConfig) -> anyhow::Result<GoogleSheetsClient> {
    GoogleSheetsClient::with_base_url(
        &config.spreadsheet_id,
        &config.sheets_access_token,
        config.request_timeout_secs,
        &config.user_agent,
        &config.sheets_base_url,
    )
    .context("failed to build Google Sheets client")
}

/// Runs the profile batch against the configured spreadsheet.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the run fails as a whole;
/// see [`runner::run_profiles`].
pub(crate) async fn run_sync(config: &AppConfig, options: &RunOptions) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let settings = ClientSettings::from_config(config);

    let summary = runner::run_profiles(&store, config, &settings, options).await?;

    let prefix = if options.dry_run { "dry-run: " } else { "" };
    println!(
        "{prefix}synced {} profiles ({} succeeded, {} blocked, {} failed)",
        summary.processed(),
        summary.succeeded,
        summary.blocked,
        summary.failed
    );
    Ok(())
}
