//! 帳本快照編解碼
//!
//! 每個物料一列，批次清單以 JSON 文字存放於單一欄位：
//! `[{"display":"05/2026","sort":"2026-05","qty":10}]`

use std::fmt;

use chrono::{DateTime, Utc};
use reagent_calc::fifo::consume_fifo;
use reagent_calc::ReportWarning;
use reagent_core::{Batch, ExpiryKey, Ledger, LedgerEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 快照版本（寫入時由儲存端產生）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotVersion(pub Uuid);

impl SnapshotVersion {
    /// 尚未寫入過的儲存
    pub fn initial() -> Self {
        Self(Uuid::nil())
    }

    pub fn next() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 持久化的一列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub item_id: String,
    pub quantity: u32,
    pub batches_json: String,
    pub last_modified: DateTime<Utc>,
}

/// 讀取到的快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub rows: Vec<SnapshotRow>,
    pub version: SnapshotVersion,
}

impl StoredSnapshot {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            version: SnapshotVersion::initial(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBatch {
    display: String,
    sort: String,
    qty: u32,
}

/// 帳本 → 資料列（總量為零的物料不寫出）
pub fn encode(ledger: &Ledger, now: DateTime<Utc>) -> reagent_core::Result<Vec<SnapshotRow>> {
    ledger
        .entries()
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let stored: Vec<StoredBatch> = entry
                .batches
                .iter()
                .map(|b| StoredBatch {
                    display: b.expiry_label.clone(),
                    sort: b.expiry_key.to_string(),
                    qty: b.quantity,
                })
                .collect();
            Ok(SnapshotRow {
                item_id: entry.item_id.clone(),
                quantity: entry.total_quantity,
                batches_json: serde_json::to_string(&stored)?,
                last_modified: now,
            })
        })
        .collect()
}

/// 依效期先出扣除多出的數量（可超過 `u32`）
fn trim_fifo(batches: &mut Vec<Batch>, excess: u64) {
    let mut remaining = excess;
    while remaining > 0 && !batches.is_empty() {
        let step = u32::try_from(remaining).unwrap_or(u32::MAX);
        let left = consume_fifo(batches, step);
        remaining -= u64::from(step - left);
        if left > 0 {
            break;
        }
    }
}

/// 資料列 → 帳本
///
/// 批次文字無法解析、或批次總和與數量不符時修正條目：
/// 不足的部分補 MANUAL 批次，多出的部分依效期先出扣除。
pub fn decode(rows: &[SnapshotRow]) -> (Ledger, Vec<ReportWarning>) {
    let mut ledger = Ledger::new();
    let mut warnings = Vec::new();

    for row in rows {
        if row.quantity == 0 {
            continue;
        }

        let stored: Vec<StoredBatch> = match serde_json::from_str(&row.batches_json) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!("物料 {} 批次資料無法解析: {}", row.item_id, err);
                warnings.push(ReportWarning::warning(
                    row.item_id.clone(),
                    format!("批次資料無法解析: {err}"),
                ));
                Vec::new()
            }
        };

        let mut batches: Vec<Batch> = stored
            .into_iter()
            .filter(|b| b.qty > 0)
            .map(|b| {
                let key = b.sort.parse::<ExpiryKey>().unwrap_or_else(|_| {
                    tracing::warn!("物料 {} 效期 {:?} 無效，視為未知效期", row.item_id, b.sort);
                    ExpiryKey::NO_EXPIRY
                });
                Batch::new(b.qty, key, b.display)
            })
            .collect();
        batches.sort_by_key(|b| b.expiry_key);

        let batch_sum: u64 = batches.iter().map(|b| u64::from(b.quantity)).sum();
        let quantity = u64::from(row.quantity);

        if batch_sum != quantity {
            tracing::warn!(
                "物料 {} 批次總和 {} 與數量 {} 不符，已修正",
                row.item_id,
                batch_sum,
                row.quantity
            );
            warnings.push(ReportWarning::warning(
                row.item_id.clone(),
                format!("批次總和 {batch_sum} 與數量 {} 不符，已修正", row.quantity),
            ));
            if batch_sum < quantity {
                batches.push(Batch::manual(row.quantity - batch_sum as u32));
            } else {
                trim_fifo(&mut batches, batch_sum - quantity);
            }
        }

        let entry = LedgerEntry::new(row.item_id.clone()).with_batches(batches);
        ledger.put(entry);
    }

    (ledger, warnings)
}
