//! Cross-instance convergence over L2 pub/sub.

pub mod error;
pub mod listener;
pub mod types;


pub use error::{SyncError, SyncResult};
pub use listener::{SyncListener, SyncOutcome};
pub use types::{ChangeNotification, ChangeOperation, SearchInvalidation};
