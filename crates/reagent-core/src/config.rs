//! 庫存策略配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::StockError;

/// 補貨策略參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderPolicy {
    /// 補貨週期涵蓋月數
    pub coverage_months: Decimal,

    /// 安全緩衝月數（交期緩衝）
    pub safety_buffer_months: Decimal,

    /// 校準品最低庫存（盒）
    pub min_stock_for_calibrators: u32,

    /// 緊急門檻（月）；未設置時使用安全緩衝
    pub urgent_threshold_months: Option<Decimal>,

    /// 是否區分「緊急」等級
    /// - true: 覆蓋月數低於門檻時標記為 Urgent
    /// - false: 併入 ReorderNeeded
    pub urgent_tier: bool,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self {
            coverage_months: Decimal::ONE,
            safety_buffer_months: Decimal::new(5, 1),
            min_stock_for_calibrators: 3,
            urgent_threshold_months: None,
            urgent_tier: true,
        }
    }
}

impl ReorderPolicy {
    /// 建構器模式：設置涵蓋月數
    pub fn with_coverage_months(mut self, months: Decimal) -> Self {
        self.coverage_months = months;
        self
    }

    /// 建構器模式：設置安全緩衝
    pub fn with_safety_buffer_months(mut self, months: Decimal) -> Self {
        self.safety_buffer_months = months;
        self
    }

    /// 建構器模式：設置校準品最低庫存
    pub fn with_min_stock_for_calibrators(mut self, min_stock: u32) -> Self {
        self.min_stock_for_calibrators = min_stock;
        self
    }

    /// 建構器模式：設置緊急門檻
    pub fn with_urgent_threshold_months(mut self, months: Decimal) -> Self {
        self.urgent_threshold_months = Some(months);
        self
    }

    /// 建構器模式：設置是否區分緊急等級
    pub fn with_urgent_tier(mut self, enabled: bool) -> Self {
        self.urgent_tier = enabled;
        self
    }

    /// 目標月數 = 涵蓋月數 + 安全緩衝
    pub fn target_months(&self) -> Decimal {
        self.coverage_months + self.safety_buffer_months
    }

    /// 實際使用的緊急門檻
    pub fn urgent_threshold(&self) -> Decimal {
        self.urgent_threshold_months
            .unwrap_or(self.safety_buffer_months)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.coverage_months < Decimal::ZERO || self.safety_buffer_months < Decimal::ZERO {
            return Err(StockError::InvalidConfig(
                "涵蓋月數與安全緩衝不可為負".to_string(),
            ));
        }
        if self.urgent_threshold() < Decimal::ZERO {
            return Err(StockError::InvalidConfig("緊急門檻不可為負".to_string()));
        }
        Ok(())
    }
}

/// 效期監控參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryPolicy {
    /// 即將到期的月數範圍
    pub horizon_months: u32,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self { horizon_months: 3 }
    }
}

impl ExpiryPolicy {
    /// 建構器模式：設置監控範圍
    pub fn with_horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = months;
        self
    }
}

/// 異動記錄保留參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPolicy {
    /// 保留天數
    pub retention_days: u32,

    /// 最大筆數
    pub max_entries: usize,

    /// 物料標籤截斷長度
    pub label_max_chars: usize,
}

impl Default for ActivityPolicy {
    fn default() -> Self {
        Self {
            retention_days: 7,
            max_entries: 50,
            label_max_chars: 15,
        }
    }
}

impl ActivityPolicy {
    /// 建構器模式：設置保留天數
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// 建構器模式：設置最大筆數
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    fn validate(&self) -> crate::Result<()> {
        if self.max_entries == 0 {
            return Err(StockError::InvalidConfig("異動記錄筆數上限必須大於零".to_string()));
        }
        Ok(())
    }
}

/// 整體配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    pub reorder: ReorderPolicy,
    pub expiry: ExpiryPolicy,
    pub activity: ActivityPolicy,
}

impl StockConfig {
    /// 由 JSON 文字載入並驗證
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: StockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置補貨策略
    pub fn with_reorder(mut self, reorder: ReorderPolicy) -> Self {
        self.reorder = reorder;
        self
    }

    /// 建構器模式：設置效期策略
    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    /// 建構器模式：設置異動記錄策略
    pub fn with_activity(mut self, activity: ActivityPolicy) -> Self {
        self.activity = activity;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> crate::Result<()> {
        self.reorder.validate()?;
        self.activity.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ReorderPolicy::default();

        assert_eq!(policy.coverage_months, Decimal::ONE);
        assert_eq!(policy.safety_buffer_months, Decimal::new(5, 1));
        assert_eq!(policy.target_months(), Decimal::new(15, 1));
        assert_eq!(policy.min_stock_for_calibrators, 3);
        assert_eq!(policy.urgent_threshold(), Decimal::new(5, 1));
        assert!(policy.urgent_tier);
    }

    #[test]
    fn test_policy_builder() {
        let policy = ReorderPolicy::default()
            .with_coverage_months(Decimal::from(2))
            .with_safety_buffer_months(Decimal::new(25, 2))
            .with_urgent_threshold_months(Decimal::ONE)
            .with_urgent_tier(false)
            .with_min_stock_for_calibrators(5);

        assert_eq!(policy.target_months(), Decimal::new(225, 2));
        assert_eq!(policy.urgent_threshold(), Decimal::ONE);
        assert!(!policy.urgent_tier);
        assert_eq!(policy.min_stock_for_calibrators, 5);
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = StockConfig::from_json_str(
            r#"{ "reorder": { "safety_buffer_months": 1 }, "expiry": { "horizon_months": 2 } }"#,
        )
        .unwrap();

        assert_eq!(config.reorder.safety_buffer_months, Decimal::ONE);
        assert_eq!(config.reorder.coverage_months, Decimal::ONE);
        assert_eq!(config.expiry.horizon_months, 2);
        assert_eq!(config.activity, ActivityPolicy::default());
    }

    #[test]
    fn test_config_rejects_negative_months() {
        let result = StockConfig::from_json_str(r#"{ "reorder": { "coverage_months": -1 } }"#);
        assert!(matches!(result, Err(StockError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let config =
            StockConfig::default().with_activity(ActivityPolicy::default().with_max_entries(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_malformed_json() {
        let result = StockConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(StockError::Serialization(_))));
    }
}
