//! Engine statistics: counters, response-time window and the sampling task.

pub mod config;
pub mod monitor;
pub mod recorder;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::StatsConfig;
pub use monitor::StatsMonitor;
pub use recorder::StatsRecorder;
pub use types::{StatsOp, Tier, TierCounters, TierStats};
