//! # Reagent Core
//!
//! 試劑庫存的核心資料模型與類型定義

pub mod activity;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod expiry;
pub mod ledger;

// Re-export 主要類型
pub use activity::{ActivityAction, ActivityEntry, ActivityLog, ActivityQuantity};
pub use batch::{Batch, MANUAL_LABEL};
pub use catalog::{Catalog, CatalogRecord};
pub use config::{ActivityPolicy, ExpiryPolicy, ReorderPolicy, StockConfig};
pub use expiry::ExpiryKey;
pub use ledger::{Ledger, LedgerEntry};

/// 庫存錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("庫存不足：物料 {item_id} 需要 {requested}, 可用 {available}")]
    InsufficientStock {
        item_id: String,
        requested: u32,
        available: u32,
    },

    #[error("數量必須大於零: {0}")]
    InvalidQuantity(String),

    #[error("找不到物料: {0}")]
    UnknownItem(String),

    #[error("無效的效期: {0}")]
    InvalidExpiry(String),

    #[error("遠端資料已變更：載入時版本 {expected}, 目前版本 {found}")]
    StaleWriteConflict { expected: String, found: String },

    #[error("儲存服務無法使用: {0}")]
    StoreUnavailable(String),

    #[error("序列化錯誤: {0}")]
    Serialization(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),
}

impl StockError {
    /// 是否為可重試的暫時性錯誤
    pub fn is_retryable(&self) -> bool {
        matches!(self, StockError::StoreUnavailable(_))
    }
}

impl From<serde_json::Error> for StockError {
    fn from(err: serde_json::Error) -> Self {
        StockError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StockError>;
