//! # Reagent Store
//!
//! 帳本持久化、快照編解碼與帳本服務

pub mod dirty_tracking;
pub mod service;
pub mod snapshot;
pub mod store;

// Re-export 主要類型
pub use service::LedgerService;
pub use snapshot::{SnapshotRow, SnapshotVersion, StoredSnapshot};
pub use store::{InMemoryStore, JsonFileStore, LedgerStore};
