//! 效期監控

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reagent_core::{Catalog, ExpiryKey, ExpiryPolicy, Ledger};
use serde::{Deserialize, Serialize};

/// 效期狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpiryStatus {
    /// 已過期
    Expired,
    /// 即將到期
    ExpiringSoon,
    Ok,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "EXPIRED",
            ExpiryStatus::ExpiringSoon => "EXPIRING_SOON",
            ExpiryStatus::Ok => "OK",
        }
    }
}

/// 單一批次的效期狀態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryLine {
    pub item_id: String,
    pub description: String,
    pub status: ExpiryStatus,
    pub quantity: u32,
    pub expiry_key: ExpiryKey,
    pub expiry_label: String,
}

/// 效期報表
#[derive(Debug, Clone, Default)]
pub struct ExpiryReport {
    /// 依效期遞增排序
    pub lines: Vec<ExpiryLine>,
}

impl ExpiryReport {
    pub fn filter(&self, status: ExpiryStatus) -> Vec<&ExpiryLine> {
        self.lines.iter().filter(|l| l.status == status).collect()
    }

    /// 各狀態的批次數
    pub fn counts_by_status(&self) -> BTreeMap<ExpiryStatus, usize> {
        let mut counts = BTreeMap::new();
        for line in &self.lines {
            *counts.entry(line.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// 效期監控器
pub struct ExpiryMonitor;

impl ExpiryMonitor {
    /// 判定單一效期鍵
    pub fn classify(key: ExpiryKey, today: NaiveDate, policy: &ExpiryPolicy) -> ExpiryStatus {
        if key.is_unknown() {
            return ExpiryStatus::Ok;
        }

        let now = ExpiryKey::from_date(today);
        let limit = now.add_months(policy.horizon_months);

        if key < now {
            ExpiryStatus::Expired
        } else if key <= limit {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Ok
        }
    }

    /// 掃描所有批次
    pub fn scan(
        ledger: &Ledger,
        catalog: &Catalog,
        today: NaiveDate,
        policy: &ExpiryPolicy,
    ) -> ExpiryReport {
        let mut lines: Vec<ExpiryLine> = ledger
            .entries()
            .flat_map(|entry| {
                let description = catalog.description_or_code(&entry.item_id);
                entry.batches.iter().map(move |batch| ExpiryLine {
                    item_id: entry.item_id.clone(),
                    description: description.clone(),
                    status: Self::classify(batch.expiry_key, today, policy),
                    quantity: batch.quantity,
                    expiry_key: batch.expiry_key,
                    expiry_label: batch.expiry_label.clone(),
                })
            })
            .collect();

        lines.sort_by(|a, b| {
            a.expiry_key
                .cmp(&b.expiry_key)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });

        let report = ExpiryReport { lines };
        let counts = report.counts_by_status();
        tracing::info!(
            "效期掃描完成：批次 {} 筆，過期 {}，即將到期 {}",
            report.lines.len(),
            counts.get(&ExpiryStatus::Expired).copied().unwrap_or(0),
            counts.get(&ExpiryStatus::ExpiringSoon).copied().unwrap_or(0)
        );

        report
    }
}
