pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod merge;
pub mod profile;
pub mod records;

use thiserror::Error;

pub use aggregate::{aggregate_by_region, build_ad_records, RegionRollupMap, RegionRollups};
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use merge::{merge_rollups, MergeSummary, STATS_COLUMNS, STATS_HEADER};
pub use profile::{Profile, ProfileStatus, RowError};
pub use records::{
    AdDetail, AdStatRecord, DailyPoint, DateRange, ItemDailyStats, RegionDayRollup, ACTIVE_STATUS,
    DATE_FORMAT, UNKNOWN_REGION,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
