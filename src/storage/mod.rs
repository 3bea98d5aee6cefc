//! Local persistence for the L1 tier.

pub mod error;
pub mod snapshot;

pub use error::{SnapshotError, SnapshotResult};
pub use snapshot::{L1Snapshot, load_snapshot, save_snapshot};
