use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("AVSYNC_SPREADSHEET_ID", "sheet-123");
    m.insert("GOOGLE_SHEETS_ACCESS_TOKEN", "ya29.token");
    m
}

#[test]
fn build_app_config_fails_without_spreadsheet_id() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "AVSYNC_SPREADSHEET_ID"),
        "expected MissingEnvVar(AVSYNC_SPREADSHEET_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_sheets_token() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("AVSYNC_SPREADSHEET_ID", "sheet-123");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GOOGLE_SHEETS_ACCESS_TOKEN"),
        "expected MissingEnvVar(GOOGLE_SHEETS_ACCESS_TOKEN), got: {result:?}"
    );
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut map = full_env();
    map.insert("AVSYNC_SPREADSHEET_ID", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.spreadsheet_id, "sheet-123");
    assert_eq!(cfg.profiles_worksheet, "profiles");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.api_base_url, "https://api.avito.ru");
    assert_eq!(cfg.sheets_base_url, "https://sheets.googleapis.com");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "avsync/0.1 (stats-sync)");
    assert_eq!(cfg.items_per_page, 100);
    assert_eq!(cfg.stats_chunk_size, 200);
    assert_eq!(cfg.stats_lookback_days, 0);
    assert_eq!(cfg.requests_per_minute, 60);
    assert_eq!(cfg.request_burst, 1);
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_ms, 1000);
    assert!(!cfg.halt_on_failure);
    assert!(cfg.review_reply_template.is_none());
}

#[test]
fn stats_chunk_size_override() {
    let mut map = full_env();
    map.insert("AVSYNC_STATS_CHUNK_SIZE", "50");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.stats_chunk_size, 50);
}

#[test]
fn stats_chunk_size_zero_is_rejected() {
    let mut map = full_env();
    map.insert("AVSYNC_STATS_CHUNK_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AVSYNC_STATS_CHUNK_SIZE"),
        "expected InvalidEnvVar(AVSYNC_STATS_CHUNK_SIZE), got: {result:?}"
    );
}

#[test]
fn items_per_page_above_upstream_limit_is_rejected() {
    let mut map = full_env();
    map.insert("AVSYNC_ITEMS_PER_PAGE", "250");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AVSYNC_ITEMS_PER_PAGE"),
        "expected InvalidEnvVar(AVSYNC_ITEMS_PER_PAGE), got: {result:?}"
    );
}

#[test]
fn requests_per_minute_invalid() {
    let mut map = full_env();
    map.insert("AVSYNC_REQUESTS_PER_MINUTE", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AVSYNC_REQUESTS_PER_MINUTE"),
        "expected InvalidEnvVar(AVSYNC_REQUESTS_PER_MINUTE), got: {result:?}"
    );
}

#[test]
fn request_burst_zero_is_rejected() {
    let mut map = full_env();
    map.insert("AVSYNC_REQUEST_BURST", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AVSYNC_REQUEST_BURST"));
}

#[test]
fn halt_on_failure_accepts_common_spellings() {
    for (raw, expected) in [("true", true), ("YES", true), ("1", true), ("no", false)] {
        let mut map = full_env();
        map.insert("AVSYNC_HALT_ON_FAILURE", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.halt_on_failure, expected, "raw value {raw:?}");
    }
}

#[test]
fn halt_on_failure_invalid() {
    let mut map = full_env();
    map.insert("AVSYNC_HALT_ON_FAILURE", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AVSYNC_HALT_ON_FAILURE"));
}

#[test]
fn blank_review_template_is_treated_as_unset() {
    let mut map = full_env();
    map.insert("AVSYNC_REVIEW_REPLY_TEMPLATE", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.review_reply_template.is_none());
}

#[test]
fn review_template_override() {
    let mut map = full_env();
    map.insert("AVSYNC_REVIEW_REPLY_TEMPLATE", "Thank you for the review!");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.review_reply_template.as_deref(),
        Some("Thank you for the review!")
    );
}

#[test]
fn debug_output_redacts_access_token() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("ya29.token"), "token leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
