//! # Reagent Calculation Engine
//!
//! 庫存異動、補貨需求與效期監控計算

pub mod consumption;
pub mod expiry_monitor;
pub mod export;
pub mod fifo;
pub mod operations;
pub mod reorder;

// Re-export 主要類型
pub use consumption::{
    monthly_consumption, ConsumptionEstimate, ConsumptionEstimator, ConsumptionSource,
};
pub use expiry_monitor::{ExpiryLine, ExpiryMonitor, ExpiryReport, ExpiryStatus};
pub use operations::{OperationOutcome, StockAction, StockOperations, StockRequest};
pub use reorder::{ReorderCalculator, ReorderLine, ReorderReport, ReorderStatus};

/// 報表警告
#[derive(Debug, Clone)]
pub struct ReportWarning {
    pub item_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ReportWarning {
    pub fn new(item_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            item_id,
            message,
            severity,
        }
    }

    pub fn info(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Info)
    }

    pub fn warning(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
