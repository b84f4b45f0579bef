#[derive(Clone)]
pub struct AppConfig {
    pub spreadsheet_id: String,
    pub sheets_access_token: String,
    pub profiles_worksheet: String,
    pub log_level: String,
    pub api_base_url: String,
    pub sheets_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub items_per_page: u32,
    pub stats_chunk_size: usize,
    pub stats_lookback_days: u32,
    pub requests_per_minute: u32,
    pub request_burst: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub halt_on_failure: bool,
    pub review_reply_template: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheets_access_token", &"[redacted]")
            .field("profiles_worksheet", &self.profiles_worksheet)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("sheets_base_url", &self.sheets_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("items_per_page", &self.items_per_page)
            .field("stats_chunk_size", &self.stats_chunk_size)
            .field("stats_lookback_days", &self.stats_lookback_days)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("request_burst", &self.request_burst)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("halt_on_failure", &self.halt_on_failure)
            .field(
                "review_reply_template",
                &self.review_reply_template.as_ref().map(|t| t.len()),
            )
            .finish()
    }
}
