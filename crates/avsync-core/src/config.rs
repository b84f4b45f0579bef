use crate::app_config::AppConfig;
use crate::ConfigError;

/// Upstream hard limit on `per_page` for the item listing endpoint.
const MAX_ITEMS_PER_PAGE: u32 = 100;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so the
/// whole surface can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = parse_u32(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let spreadsheet_id = require("AVSYNC_SPREADSHEET_ID")?;
    let sheets_access_token = require("GOOGLE_SHEETS_ACCESS_TOKEN")?;

    let profiles_worksheet = or_default("AVSYNC_PROFILES_WORKSHEET", "profiles");
    let log_level = or_default("AVSYNC_LOG_LEVEL", "info");
    let api_base_url = or_default("AVSYNC_API_BASE_URL", "https://api.avito.ru");
    let sheets_base_url = or_default("AVSYNC_SHEETS_BASE_URL", "https://sheets.googleapis.com");
    let request_timeout_secs = parse_u64("AVSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("AVSYNC_USER_AGENT", "avsync/0.1 (stats-sync)");

    let items_per_page = parse_positive_u32("AVSYNC_ITEMS_PER_PAGE", "100")?;
    if items_per_page > MAX_ITEMS_PER_PAGE {
        return Err(invalid(
            "AVSYNC_ITEMS_PER_PAGE",
            format!("must not exceed {MAX_ITEMS_PER_PAGE}"),
        ));
    }

    let stats_chunk_size = parse_positive_u32("AVSYNC_STATS_CHUNK_SIZE", "200")? as usize;
    let stats_lookback_days = parse_u32("AVSYNC_STATS_LOOKBACK_DAYS", "0")?;
    let requests_per_minute = parse_positive_u32("AVSYNC_REQUESTS_PER_MINUTE", "60")?;
    let request_burst = parse_positive_u32("AVSYNC_REQUEST_BURST", "1")?;
    let max_retries = parse_u32("AVSYNC_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("AVSYNC_RETRY_BACKOFF_BASE_MS", "1000")?;
    let halt_on_failure = parse_bool(&or_default("AVSYNC_HALT_ON_FAILURE", "false"))
        .ok_or_else(|| invalid("AVSYNC_HALT_ON_FAILURE", "expected true or false".to_string()))?;
    let review_reply_template = lookup("AVSYNC_REVIEW_REPLY_TEMPLATE")
        .ok()
        .filter(|t| !t.trim().is_empty());

    Ok(AppConfig {
        spreadsheet_id,
        sheets_access_token,
        profiles_worksheet,
        log_level,
        api_base_url,
        sheets_base_url,
        request_timeout_secs,
        user_agent,
        items_per_page,
        stats_chunk_size,
        stats_lookback_days,
        requests_per_minute,
        request_burst,
        max_retries,
        retry_backoff_base_ms,
        halt_on_failure,
        review_reply_template,
    })
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no` in any case.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
