//! 庫存異動引擎（收貨 / 領用 / 盤點調整）

use reagent_core::{
    ActivityAction, ActivityQuantity, Batch, ExpiryKey, LedgerEntry, StockError,
};
use serde::{Deserialize, Serialize};

use crate::fifo::consume_fifo;

/// 異動動作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockAction {
    /// 收貨：新增一個批次
    Receive {
        quantity: u32,
        expiry_key: ExpiryKey,
        expiry_label: String,
    },
    /// 領用：依效期先出扣減
    Withdraw { quantity: u32 },
    /// 盤點調整：設定絕對總量
    Adjust { new_total: u32 },
}

impl StockAction {
    /// 收貨，標籤由效期產生（MM/YYYY）
    pub fn receive(quantity: u32, expiry_key: ExpiryKey) -> Self {
        StockAction::Receive {
            quantity,
            expiry_key,
            expiry_label: expiry_key.display_label(),
        }
    }

    pub fn withdraw(quantity: u32) -> Self {
        StockAction::Withdraw { quantity }
    }

    pub fn adjust(new_total: u32) -> Self {
        StockAction::Adjust { new_total }
    }

    pub fn kind(&self) -> ActivityAction {
        match self {
            StockAction::Receive { .. } => ActivityAction::Receive,
            StockAction::Withdraw { .. } => ActivityAction::Withdraw,
            StockAction::Adjust { .. } => ActivityAction::Adjust,
        }
    }
}

/// 異動請求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    pub item_id: String,
    pub action: StockAction,
}

impl StockRequest {
    pub fn new(item_id: String, action: StockAction) -> Self {
        Self { item_id, action }
    }
}

/// 異動結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    /// 已套用，需要寫回並記錄
    Applied {
        action: ActivityAction,
        quantity: ActivityQuantity,
        new_total: u32,
    },
    /// 調整後總量不變，無需寫回
    NoChangeNeeded,
}

impl OperationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, OperationOutcome::Applied { .. })
    }
}

/// 庫存異動引擎
pub struct StockOperations;

impl StockOperations {
    /// 套用異動動作
    pub fn apply(
        entry: &mut LedgerEntry,
        action: &StockAction,
    ) -> reagent_core::Result<OperationOutcome> {
        match action {
            StockAction::Receive {
                quantity,
                expiry_key,
                expiry_label,
            } => Self::receive(entry, *quantity, *expiry_key, expiry_label.clone()),
            StockAction::Withdraw { quantity } => Self::withdraw(entry, *quantity),
            StockAction::Adjust { new_total } => Self::adjust(entry, *new_total),
        }
    }

    /// 收貨
    pub fn receive(
        entry: &mut LedgerEntry,
        quantity: u32,
        expiry_key: ExpiryKey,
        expiry_label: String,
    ) -> reagent_core::Result<OperationOutcome> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity(format!("收貨 {}", entry.item_id)));
        }
        let new_total = entry.total_quantity.checked_add(quantity).ok_or_else(|| {
            StockError::InvalidQuantity(format!("收貨後總量溢位 {}", entry.item_id))
        })?;

        entry.total_quantity = new_total;
        entry.batches.push(Batch::new(quantity, expiry_key, expiry_label));
        entry.sort_batches();

        tracing::debug!(
            "收貨 {}: +{} (效期 {}), 總量 {}",
            entry.item_id,
            quantity,
            expiry_key,
            new_total
        );

        Ok(OperationOutcome::Applied {
            action: ActivityAction::Receive,
            quantity: ActivityQuantity::Delta(quantity),
            new_total,
        })
    }

    /// 領用（庫存不足時不修改條目）
    pub fn withdraw(
        entry: &mut LedgerEntry,
        quantity: u32,
    ) -> reagent_core::Result<OperationOutcome> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity(format!("領用 {}", entry.item_id)));
        }
        if quantity > entry.total_quantity {
            return Err(StockError::InsufficientStock {
                item_id: entry.item_id.clone(),
                requested: quantity,
                available: entry.total_quantity,
            });
        }

        entry.total_quantity -= quantity;
        let remaining = consume_fifo(&mut entry.batches, quantity);
        debug_assert_eq!(remaining, 0, "批次總和與總量不一致");

        tracing::debug!(
            "領用 {}: -{}, 總量 {}",
            entry.item_id,
            quantity,
            entry.total_quantity
        );

        Ok(OperationOutcome::Applied {
            action: ActivityAction::Withdraw,
            quantity: ActivityQuantity::Delta(quantity),
            new_total: entry.total_quantity,
        })
    }

    /// 盤點調整為絕對總量
    ///
    /// - 增加：補一個效期未知的 MANUAL 批次（排在最後）
    /// - 減少：依效期先出扣減差額
    pub fn adjust(
        entry: &mut LedgerEntry,
        new_total: u32,
    ) -> reagent_core::Result<OperationOutcome> {
        let current = entry.total_quantity;

        if new_total == current {
            tracing::debug!("調整 {}: 總量已為 {}，無需變更", entry.item_id, current);
            return Ok(OperationOutcome::NoChangeNeeded);
        }

        if new_total > current {
            let diff = new_total - current;
            entry.batches.push(Batch::manual(diff));
            entry.sort_batches();
        } else {
            let diff = current - new_total;
            let remaining = consume_fifo(&mut entry.batches, diff);
            debug_assert_eq!(remaining, 0, "批次總和與總量不一致");
        }
        entry.total_quantity = new_total;

        tracing::debug!("調整 {}: {} -> {}", entry.item_id, current, new_total);

        Ok(OperationOutcome::Applied {
            action: ActivityAction::Adjust,
            quantity: ActivityQuantity::SetTo(new_total),
            new_total,
        })
    }
}
