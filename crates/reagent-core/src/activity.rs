//! 庫存異動記錄

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ActivityPolicy;

/// 異動類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    /// 收貨
    Receive,
    /// 領用
    Withdraw,
    /// 盤點調整
    Adjust,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityAction::Receive => "Receive",
            ActivityAction::Withdraw => "Withdraw",
            ActivityAction::Adjust => "Adjust",
        };
        f.write_str(name)
    }
}

/// 異動數量：收貨/領用為增減量，調整為設定後的總量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityQuantity {
    Delta(u32),
    SetTo(u32),
}

impl fmt::Display for ActivityQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityQuantity::Delta(qty) => write!(f, "{qty}"),
            ActivityQuantity::SetTo(qty) => write!(f, "-> {qty}"),
        }
    }
}

/// 異動記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: ActivityAction,
    pub item_id: String,
    /// 截斷後的物料標籤
    pub item_label: String,
    pub quantity: ActivityQuantity,
}

impl ActivityEntry {
    /// 創建新的異動記錄
    pub fn new(
        timestamp: DateTime<Utc>,
        action: ActivityAction,
        item_id: String,
        item_label: String,
        quantity: ActivityQuantity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            action,
            item_id,
            item_label,
            quantity,
        }
    }
}

/// 截斷標籤：超過上限時保留前段並加上 `...`
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut short: String = label.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

/// 近期異動記錄（新到舊，依天數與筆數上限修剪）
#[derive(Debug, Clone)]
pub struct ActivityLog {
    policy: ActivityPolicy,
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new(policy: ActivityPolicy) -> Self {
        Self {
            policy,
            entries: VecDeque::new(),
        }
    }

    /// 新增記錄並修剪
    pub fn record(&mut self, entry: ActivityEntry) {
        let now = entry.timestamp;
        self.entries.push_front(entry);
        self.prune(now);
    }

    /// 保留期間的起點；天數大到無法換算時為 None（全部保留）
    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Duration::try_days(i64::from(self.policy.retention_days))
            .and_then(|window| now.checked_sub_signed(window))
    }

    /// 移除超出保留期間或筆數上限的記錄
    pub fn prune(&mut self, now: DateTime<Utc>) {
        if let Some(cutoff) = self.cutoff(now) {
            self.entries.retain(|e| e.timestamp >= cutoff);
        }
        self.entries.truncate(self.policy.max_entries);
    }

    /// 所有保存中的記錄（新到舊）
    ///
    /// 只在 `record` / `prune` 時修剪，可能包含已超出保留期間的記錄；
    /// 顯示用請改用 `recent_at`。
    pub fn recent(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// 以 `now` 為準仍在保留期間內的記錄（新到舊）
    pub fn recent_at(&self, now: DateTime<Utc>) -> impl Iterator<Item = &ActivityEntry> {
        let cutoff = self.cutoff(now);
        self.entries
            .iter()
            .filter(move |e| cutoff.map_or(true, |c| e.timestamp >= c))
    }

    pub fn policy(&self) -> &ActivityPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(ActivityPolicy::default())
    }
}
