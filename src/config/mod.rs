//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `LEXCACHE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::config::{L1Config, TieringPolicy};
use crate::cache::l2::L2Config;
use crate::cache::l3::ArchiveConfig;
use crate::constants::MILLIS_PER_DAY;
use crate::stats::StatsConfig;

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `LEXCACHE_*` overrides on top of defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub l1: L1Config,
    pub tiering: TieringPolicy,
    pub l2: L2Config,
    pub archive: ArchiveConfig,
    pub stats: StatsConfig,
    /// L1 snapshot file. Loaded on start and written on destroy when set.
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    const ENV_CATEGORIES: &'static str = "LEXCACHE_CATEGORIES";
    const ENV_L1_MAX_SIZE_BYTES: &'static str = "LEXCACHE_L1_MAX_SIZE_BYTES";
    const ENV_EVICTION_THRESHOLD: &'static str = "LEXCACHE_EVICTION_THRESHOLD";
    const ENV_EVICTION_FRACTION: &'static str = "LEXCACHE_EVICTION_FRACTION";
    const ENV_PROMOTION_THRESHOLD: &'static str = "LEXCACHE_PROMOTION_THRESHOLD";
    const ENV_SIZE_FLOOR_BYTES: &'static str = "LEXCACHE_SIZE_FLOOR_BYTES";
    const ENV_PRIORITY_FLOOR: &'static str = "LEXCACHE_PRIORITY_FLOOR";
    const ENV_AGE_FLOOR_DAYS: &'static str = "LEXCACHE_AGE_FLOOR_DAYS";
    const ENV_SEARCH_LIMIT: &'static str = "LEXCACHE_SEARCH_LIMIT";
    const ENV_KEY_PREFIX: &'static str = "LEXCACHE_KEY_PREFIX";
    const ENV_DOCUMENT_TTL_SECS: &'static str = "LEXCACHE_DOCUMENT_TTL_SECS";
    const ENV_SEARCH_TTL_SECS: &'static str = "LEXCACHE_SEARCH_TTL_SECS";
    const ENV_HEALTH_INTERVAL_SECS: &'static str = "LEXCACHE_HEALTH_INTERVAL_SECS";
    const ENV_COMPRESS_ARCHIVES: &'static str = "LEXCACHE_COMPRESS_ARCHIVES";
    const ENV_COMPRESSION_FLOOR_BYTES: &'static str = "LEXCACHE_COMPRESSION_FLOOR_BYTES";
    const ENV_STATS_INTERVAL_SECS: &'static str = "LEXCACHE_STATS_INTERVAL_SECS";
    const ENV_SNAPSHOT_PATH: &'static str = "LEXCACHE_SNAPSHOT_PATH";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(categories) = Self::parse_list_from_env(Self::ENV_CATEGORIES) {
            config.l1.categories = categories;
        }
        config.l1.max_size_bytes =
            Self::parse_from_env(Self::ENV_L1_MAX_SIZE_BYTES, config.l1.max_size_bytes)?;
        config.l1.eviction_threshold =
            Self::parse_from_env(Self::ENV_EVICTION_THRESHOLD, config.l1.eviction_threshold)?;
        config.l1.eviction_fraction =
            Self::parse_from_env(Self::ENV_EVICTION_FRACTION, config.l1.eviction_fraction)?;

        config.tiering.promotion_access_threshold = Self::parse_from_env(
            Self::ENV_PROMOTION_THRESHOLD,
            config.tiering.promotion_access_threshold,
        )?;
        config.tiering.size_floor_bytes =
            Self::parse_from_env(Self::ENV_SIZE_FLOOR_BYTES, config.tiering.size_floor_bytes)?;
        config.tiering.priority_floor =
            Self::parse_from_env(Self::ENV_PRIORITY_FLOOR, config.tiering.priority_floor)?;
        let age_floor_days: u64 = Self::parse_from_env(
            Self::ENV_AGE_FLOOR_DAYS,
            config.tiering.age_floor.as_millis() as u64 / MILLIS_PER_DAY as u64,
        )?;
        let age_floor_millis = age_floor_days
            .checked_mul(MILLIS_PER_DAY as u64)
            .filter(|millis| *millis <= i64::MAX as u64)
            .ok_or_else(|| ConfigError::InvalidValue {
                name: Self::ENV_AGE_FLOOR_DAYS,
                value: age_floor_days.to_string(),
                reason: "age floor overflows millisecond timestamps".to_string(),
            })?;
        config.tiering.age_floor = Duration::from_millis(age_floor_millis);
        config.tiering.search_result_limit =
            Self::parse_from_env(Self::ENV_SEARCH_LIMIT, config.tiering.search_result_limit)?;

        config.l2.key_prefix = Self::parse_string_from_env(Self::ENV_KEY_PREFIX, config.l2.key_prefix);
        config.l2.default_ttl =
            Self::parse_secs_from_env(Self::ENV_DOCUMENT_TTL_SECS, config.l2.default_ttl)?;
        config.l2.search_ttl =
            Self::parse_secs_from_env(Self::ENV_SEARCH_TTL_SECS, config.l2.search_ttl)?;
        config.l2.health_interval =
            Self::parse_secs_from_env(Self::ENV_HEALTH_INTERVAL_SECS, config.l2.health_interval)?;

        config.archive.compress_archives =
            Self::parse_bool_from_env(Self::ENV_COMPRESS_ARCHIVES, config.archive.compress_archives)?;
        config.archive.compression_floor_bytes = Self::parse_from_env(
            Self::ENV_COMPRESSION_FLOOR_BYTES,
            config.archive.compression_floor_bytes,
        )?;

        config.stats.interval =
            Self::parse_secs_from_env(Self::ENV_STATS_INTERVAL_SECS, config.stats.interval)?;

        config.snapshot_path = Self::parse_optional_path_from_env(Self::ENV_SNAPSHOT_PATH);

        Ok(config)
    }

    /// Checks every sub-configuration (does not touch the filesystem beyond `stat`).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.l1.validate().map_err(|e| ConfigError::Invalid {
            section: "l1",
            reason: e.to_string(),
        })?;
        self.tiering.validate().map_err(|e| ConfigError::Invalid {
            section: "tiering",
            reason: e.to_string(),
        })?;
        self.l2.validate().map_err(|e| ConfigError::Invalid {
            section: "l2",
            reason: e.to_string(),
        })?;
        if self.stats.interval.is_zero() {
            return Err(ConfigError::Invalid {
                section: "stats",
                reason: "interval must be > 0".to_string(),
            });
        }
        if let Some(ref path) = self.snapshot_path
            && path.exists()
            && !path.is_file()
        {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }
        Ok(())
    }

    fn parse_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name,
                    value,
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_secs_from_env(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        Self::parse_from_env(name, default.as_secs()).map(Duration::from_secs)
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name,
                    value,
                    reason: "expected a boolean".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_list_from_env(name: &str) -> Option<Vec<String>> {
        let value = env::var(name).ok()?;
        let items: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    fn parse_optional_path_from_env(name: &str) -> Option<PathBuf> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(name: &str, default: String) -> String {
        env::var(name).unwrap_or(default)
    }
}
