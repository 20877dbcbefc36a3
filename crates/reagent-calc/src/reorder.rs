//! 補貨需求計算

use std::collections::BTreeMap;

use reagent_core::{Catalog, CatalogRecord, Ledger, ReorderPolicy};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consumption::{ConsumptionEstimator, ConsumptionSource};
use crate::ReportWarning;

/// 補貨狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReorderStatus {
    /// 校準品低於最低庫存
    BelowMinimum,
    /// 缺貨
    OutOfStock,
    /// 覆蓋月數低於緊急門檻
    Urgent,
    /// 需要補貨
    ReorderNeeded,
    /// 庫存充足
    Ok,
    /// 無用量資料，僅供參考
    Unknown,
}

impl ReorderStatus {
    /// 是否需要處理（排除 Ok 與 Unknown）
    pub fn needs_attention(&self) -> bool {
        !matches!(self, ReorderStatus::Ok | ReorderStatus::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReorderStatus::BelowMinimum => "BELOW_MINIMUM",
            ReorderStatus::OutOfStock => "OUT_OF_STOCK",
            ReorderStatus::Urgent => "URGENT",
            ReorderStatus::ReorderNeeded => "REORDER_NEEDED",
            ReorderStatus::Ok => "OK",
            ReorderStatus::Unknown => "UNKNOWN",
        }
    }
}

/// 單一物料的補貨建議
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderLine {
    pub item_id: String,
    pub description: String,
    pub is_calibrator: bool,
    /// 現有庫存
    pub current_stock: u32,
    /// 每月盒數
    pub consumption: Decimal,
    pub consumption_source: ConsumptionSource,
    /// 目標庫存
    pub target_stock: u32,
    /// 建議訂購量
    pub to_order: u32,
    /// 可用月數（無用量時為 None）
    pub coverage_months: Option<Decimal>,
    pub status: ReorderStatus,
}

/// 補貨報表
#[derive(Debug, Clone, Default)]
pub struct ReorderReport {
    /// 依建議訂購量遞減排序
    pub lines: Vec<ReorderLine>,
    pub warnings: Vec<ReportWarning>,
}

impl ReorderReport {
    /// 只保留指定狀態
    pub fn filter_status(&self, statuses: &[ReorderStatus]) -> Vec<&ReorderLine> {
        self.lines
            .iter()
            .filter(|line| statuses.is_empty() || statuses.contains(&line.status))
            .collect()
    }

    /// 不區分大小寫搜尋描述或代碼
    pub fn search(&self, term: &str) -> Vec<&ReorderLine> {
        let term = term.trim().to_lowercase();
        self.lines
            .iter()
            .filter(|line| {
                term.is_empty()
                    || line.description.to_lowercase().contains(&term)
                    || line.item_id.to_lowercase().contains(&term)
            })
            .collect()
    }

    /// 各狀態筆數
    pub fn counts_by_status(&self) -> BTreeMap<ReorderStatus, usize> {
        let mut counts = BTreeMap::new();
        for line in &self.lines {
            *counts.entry(line.status).or_insert(0) += 1;
        }
        counts
    }

    /// 建議訂購總量
    pub fn total_to_order(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.to_order)).sum()
    }

    pub fn line(&self, item_id: &str) -> Option<&ReorderLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }
}

/// 補貨需求計算器
pub struct ReorderCalculator;

impl ReorderCalculator {
    /// 計算整份主檔的補貨建議
    pub fn calculate(ledger: &Ledger, catalog: &Catalog, policy: &ReorderPolicy) -> ReorderReport {
        tracing::info!(
            "開始補貨計算：主檔 {} 筆，庫存 {} 筆",
            catalog.len(),
            ledger.len()
        );

        let mut report = ReorderReport::default();

        for record in catalog.records() {
            let stock = ledger.stock_of(&record.item_id);
            report.lines.push(Self::evaluate(record, stock, policy));
        }

        for entry in ledger.entries() {
            if !catalog.contains(&entry.item_id) {
                tracing::warn!("物料 {} 有庫存但不在主檔中", entry.item_id);
                report.warnings.push(ReportWarning::info(
                    entry.item_id.clone(),
                    format!("不在主檔中，庫存 {} 未列入補貨計算", entry.total_quantity),
                ));
            }
        }

        report
            .lines
            .sort_by(|a, b| b.to_order.cmp(&a.to_order).then_with(|| a.item_id.cmp(&b.item_id)));

        tracing::info!(
            "補貨計算完成，需處理 {} 筆",
            report.lines.iter().filter(|l| l.status.needs_attention()).count()
        );

        report
    }

    /// 單一物料的補貨建議
    pub fn evaluate(
        record: &CatalogRecord,
        current_stock: u32,
        policy: &ReorderPolicy,
    ) -> ReorderLine {
        let estimate = ConsumptionEstimator::estimate(record);
        let consumption = estimate.boxes_per_month;
        let is_calibrator = record.is_calibrator();

        let mut target_stock = Self::target_for(consumption, policy.target_months());
        if is_calibrator {
            target_stock = target_stock.max(policy.min_stock_for_calibrators);
        }

        let to_order = target_stock.saturating_sub(current_stock);

        let coverage_months = if consumption > Decimal::ZERO {
            Some(Decimal::from(current_stock) / consumption)
        } else {
            None
        };

        let status = Self::classify(
            is_calibrator,
            consumption,
            current_stock,
            to_order,
            coverage_months,
            policy,
        );

        tracing::debug!(
            "物料 {}: 用量 {}/月, 目標 {}, 庫存 {}, 建議 {}, 狀態 {:?}",
            record.item_id,
            consumption,
            target_stock,
            current_stock,
            to_order,
            status
        );

        ReorderLine {
            item_id: record.item_id.clone(),
            description: record.description.clone(),
            is_calibrator,
            current_stock,
            consumption,
            consumption_source: estimate.source,
            target_stock,
            to_order,
            coverage_months,
            status,
        }
    }

    /// 目標庫存 = ceil(月用量 × 目標月數)
    pub fn target_for(consumption: Decimal, target_months: Decimal) -> u32 {
        let target = (consumption * target_months).ceil();
        if target <= Decimal::ZERO {
            0
        } else {
            target.to_u32().unwrap_or(u32::MAX)
        }
    }

    /// 狀態判定（依序，先符合者為準）
    pub fn classify(
        is_calibrator: bool,
        consumption: Decimal,
        current_stock: u32,
        to_order: u32,
        coverage_months: Option<Decimal>,
        policy: &ReorderPolicy,
    ) -> ReorderStatus {
        if is_calibrator && current_stock < policy.min_stock_for_calibrators {
            return ReorderStatus::BelowMinimum;
        }
        if current_stock == 0 {
            return ReorderStatus::OutOfStock;
        }
        if !is_calibrator && consumption <= Decimal::ZERO {
            return ReorderStatus::Unknown;
        }
        if let Some(coverage) = coverage_months {
            if policy.urgent_tier && coverage < policy.urgent_threshold() {
                return ReorderStatus::Urgent;
            }
        }
        if to_order > 0 {
            return ReorderStatus::ReorderNeeded;
        }
        ReorderStatus::Ok
    }
}
