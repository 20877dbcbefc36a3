//! 帳本服務：載入 → 異動 → 寫回
//!
//! 異動先套用在工作副本上，寫回成功後才更新記憶體中的帳本與異動記錄。

use chrono::{DateTime, NaiveDate, Utc};
use reagent_calc::{
    ExpiryMonitor, ExpiryReport, OperationOutcome, ReorderCalculator, ReorderReport,
    ReportWarning, StockAction, StockOperations, StockRequest,
};
use reagent_core::activity::truncate_label;
use reagent_core::{
    ActivityEntry, ActivityLog, Catalog, ExpiryKey, Ledger, StockConfig, StockError,
};

use crate::dirty_tracking::DirtyTracker;
use crate::snapshot::{self, SnapshotVersion};
use crate::store::LedgerStore;

/// 帳本服務
pub struct LedgerService<S: LedgerStore> {
    store: S,
    catalog: Catalog,
    config: StockConfig,
    ledger: Ledger,
    version: SnapshotVersion,
    activity: ActivityLog,
    dirty: DirtyTracker,
    load_warnings: Vec<ReportWarning>,
}

impl<S: LedgerStore> LedgerService<S> {
    /// 從儲存載入帳本
    pub fn load(store: S, catalog: Catalog, config: StockConfig) -> reagent_core::Result<Self> {
        config.validate()?;

        let activity = ActivityLog::new(config.activity.clone());
        let mut service = Self {
            store,
            catalog,
            config,
            ledger: Ledger::new(),
            version: SnapshotVersion::initial(),
            activity,
            dirty: DirtyTracker::new(),
            load_warnings: Vec::new(),
        };
        service.reload()?;
        Ok(service)
    }

    /// 重新讀取儲存（不使用快取）
    pub fn reload(&mut self) -> reagent_core::Result<()> {
        let stored = self.store.fetch()?;
        let (ledger, warnings) = snapshot::decode(&stored.rows);

        tracing::info!(
            "載入帳本：物料 {} 筆，版本 {}，修正 {} 筆",
            ledger.len(),
            stored.version,
            warnings.len()
        );

        self.ledger = ledger;
        self.version = stored.version;
        self.load_warnings = warnings;
        self.dirty.clear();
        Ok(())
    }

    /// 收貨
    pub fn receive(
        &mut self,
        item_id: &str,
        quantity: u32,
        expiry_key: ExpiryKey,
    ) -> reagent_core::Result<OperationOutcome> {
        self.apply(&StockRequest::new(
            item_id.to_string(),
            StockAction::receive(quantity, expiry_key),
        ))
    }

    /// 領用
    pub fn withdraw(
        &mut self,
        item_id: &str,
        quantity: u32,
    ) -> reagent_core::Result<OperationOutcome> {
        self.apply(&StockRequest::new(
            item_id.to_string(),
            StockAction::withdraw(quantity),
        ))
    }

    /// 盤點調整
    pub fn adjust(
        &mut self,
        item_id: &str,
        new_total: u32,
    ) -> reagent_core::Result<OperationOutcome> {
        self.apply(&StockRequest::new(
            item_id.to_string(),
            StockAction::adjust(new_total),
        ))
    }

    /// 套用異動並寫回
    pub fn apply(&mut self, request: &StockRequest) -> reagent_core::Result<OperationOutcome> {
        self.apply_at(request, Utc::now())
    }

    /// 以指定時間套用異動並寫回
    pub fn apply_at(
        &mut self,
        request: &StockRequest,
        now: DateTime<Utc>,
    ) -> reagent_core::Result<OperationOutcome> {
        let item_id = request.item_id.as_str();

        let description = match self.catalog.get(item_id) {
            Some(record) => record.description.clone(),
            None => {
                tracing::warn!("拒絕異動：物料 {} 不在主檔中", item_id);
                return Err(StockError::UnknownItem(item_id.to_string()));
            }
        };

        let mut working = self.ledger.working_copy(item_id);
        let outcome = StockOperations::apply(&mut working, &request.action).map_err(|err| {
            tracing::warn!("拒絕異動 {} {}: {}", request.action.kind(), item_id, err);
            err
        })?;

        let (action, quantity, new_total) = match outcome {
            OperationOutcome::NoChangeNeeded => {
                tracing::info!("物料 {} 無需調整", item_id);
                return Ok(outcome);
            }
            OperationOutcome::Applied {
                action,
                quantity,
                new_total,
            } => (action, quantity, new_total),
        };

        let mut next = self.ledger.clone();
        next.put(working);
        let rows = snapshot::encode(&next, now)?;

        let new_version = self.store.store(rows, self.version).map_err(|err| {
            tracing::warn!("寫回失敗，{} {} 未生效: {}", action, item_id, err);
            err
        })?;

        self.ledger = next;
        self.version = new_version;
        self.dirty.mark(item_id);
        self.activity.record(ActivityEntry::new(
            now,
            action,
            item_id.to_string(),
            truncate_label(&description, self.config.activity.label_max_chars),
            quantity,
        ));

        tracing::info!(
            "異動完成 {} {} ({}): 總量 {}，版本 {}",
            action,
            item_id,
            quantity,
            new_total,
            new_version
        );

        Ok(outcome)
    }

    /// 補貨報表
    pub fn reorder_report(&self) -> ReorderReport {
        ReorderCalculator::calculate(&self.ledger, &self.catalog, &self.config.reorder)
    }

    /// 效期報表
    pub fn expiry_report(&self, today: NaiveDate) -> ExpiryReport {
        ExpiryMonitor::scan(&self.ledger, &self.catalog, today, &self.config.expiry)
    }

    pub fn stock_of(&self, item_id: &str) -> u32 {
        self.ledger.stock_of(item_id)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// 保留期間內的近期異動（新到舊）
    pub fn recent_activity(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.activity.recent_at(Utc::now())
    }

    /// 本次載入後異動過的物料
    pub fn changed_items(&self) -> Vec<String> {
        self.dirty.changed_items()
    }

    /// 載入時的修正警告
    pub fn load_warnings(&self) -> &[ReportWarning] {
        &self.load_warnings
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
