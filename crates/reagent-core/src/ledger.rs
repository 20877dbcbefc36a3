//! 庫存帳本模型

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Batch;

/// 單一物料的帳本條目
///
/// 不變式：`total_quantity` 恆等於所有批次數量之和，
/// 批次依效期鍵遞增排列，且不保留數量為零的批次。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 物料ID
    pub item_id: String,

    /// 總庫存
    pub total_quantity: u32,

    /// 批次（依效期遞增）
    pub batches: Vec<Batch>,
}

impl LedgerEntry {
    /// 創建空的帳本條目
    pub fn new(item_id: String) -> Self {
        Self {
            item_id,
            total_quantity: 0,
            batches: Vec::new(),
        }
    }

    /// 建構器模式：設置批次並同步總量
    ///
    /// 批次總和超過 `u32` 時總量封頂，條目將不一致（`is_consistent` 為 false）。
    pub fn with_batches(mut self, batches: Vec<Batch>) -> Self {
        self.batches = batches;
        self.batches.retain(|b| b.quantity > 0);
        self.sort_batches();
        self.total_quantity = u32::try_from(self.batch_sum()).unwrap_or(u32::MAX);
        self
    }

    /// 批次數量總和（以 u64 累加，不會溢位）
    pub fn batch_sum(&self) -> u64 {
        self.batches.iter().map(|b| u64::from(b.quantity)).sum()
    }

    /// 檢查總量與批次是否一致
    pub fn is_consistent(&self) -> bool {
        u64::from(self.total_quantity) == self.batch_sum()
            && self.batches.iter().all(|b| b.quantity > 0)
            && self
                .batches
                .windows(2)
                .all(|w| w[0].expiry_key <= w[1].expiry_key)
    }

    /// 依效期排序（穩定排序，同效期保留到貨順序）
    pub fn sort_batches(&mut self) {
        self.batches.sort_by_key(|b| b.expiry_key);
    }

    pub fn is_empty(&self) -> bool {
        self.total_quantity == 0
    }
}

/// 帳本快照（物料ID → 帳本條目）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查詢條目
    pub fn get(&self, item_id: &str) -> Option<&LedgerEntry> {
        self.entries.get(item_id)
    }

    /// 現有庫存（無條目時為 0）
    pub fn stock_of(&self, item_id: &str) -> u32 {
        self.get(item_id).map(|e| e.total_quantity).unwrap_or(0)
    }

    /// 寫入條目；總量為零時移除
    pub fn put(&mut self, entry: LedgerEntry) {
        if entry.is_empty() {
            self.entries.remove(&entry.item_id);
        } else {
            self.entries.insert(entry.item_id.clone(), entry);
        }
    }

    /// 取出條目的工作副本（不存在時為空條目）
    pub fn working_copy(&self, item_id: &str) -> LedgerEntry {
        self.get(item_id)
            .cloned()
            .unwrap_or_else(|| LedgerEntry::new(item_id.to_string()))
    }

    /// 依物料ID順序遍歷
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LedgerEntry> for Ledger {
    fn from_iter<T: IntoIterator<Item = LedgerEntry>>(iter: T) -> Self {
        let mut ledger = Ledger::new();
        for entry in iter {
            ledger.put(entry);
        }
        ledger
    }
}
