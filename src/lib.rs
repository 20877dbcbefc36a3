//! # Reagent
//!
//! 實驗室試劑庫存管理：批次帳本、補貨建議與效期監控

pub mod logging;

pub use reagent_calc::{
    ExpiryMonitor, ExpiryStatus, OperationOutcome, ReorderCalculator, ReorderStatus,
    StockAction, StockOperations, StockRequest,
};
pub use reagent_core::{
    Batch, Catalog, CatalogRecord, ExpiryKey, Ledger, LedgerEntry, StockConfig, StockError,
};
pub use reagent_store::{InMemoryStore, JsonFileStore, LedgerService, LedgerStore};
