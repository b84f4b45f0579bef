use avsync_core::AppConfig;

use crate::runner::{self, ProfileRow};
use crate::sync::build_store;

/// Prints one line per non-blank profile row.
///
/// # Errors
///
/// Returns an error if the profiles worksheet cannot be read.
pub(crate) async fn run_list_profiles(config: &AppConfig) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let rows = runner::load_profile_rows(&store, &config.profiles_worksheet).await?;

    if rows.is_empty() {
        println!(
            "no profile rows found in worksheet '{}'",
            config.profiles_worksheet
        );
        return Ok(());
    }

    for row in &rows {
        println!("{}", describe_row(row));
    }
    Ok(())
}

fn describe_row(row: &ProfileRow) -> String {
    match &row.parsed {
        Ok(profile) => format!(
            "row {:>3}  {:<20} {:<16} {}",
            row.row, profile.label, profile.profile_id, profile.status
        ),
        Err(e) => format!("row {:>3}  invalid: {e}", row.row),
    }
}
