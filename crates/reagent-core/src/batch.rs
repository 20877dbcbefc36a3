//! 批次模型

use serde::{Deserialize, Serialize};

use crate::ExpiryKey;

/// 手動調整產生的批次標籤
pub const MANUAL_LABEL: &str = "MANUAL";

/// 批次（同一次收貨、同一效期的一批庫存）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// 數量（盒）
    pub quantity: u32,

    /// 效期排序鍵
    pub expiry_key: ExpiryKey,

    /// 顯示用效期標籤（不參與邏輯）
    pub expiry_label: String,
}

impl Batch {
    /// 創建新的批次
    pub fn new(quantity: u32, expiry_key: ExpiryKey, expiry_label: String) -> Self {
        Self {
            quantity,
            expiry_key,
            expiry_label,
        }
    }

    /// 以效期鍵產生標籤的批次
    pub fn dated(quantity: u32, expiry_key: ExpiryKey) -> Self {
        let label = expiry_key.display_label();
        Self::new(quantity, expiry_key, label)
    }

    /// 效期未知的手動批次
    pub fn manual(quantity: u32) -> Self {
        Self::new(quantity, ExpiryKey::NO_EXPIRY, MANUAL_LABEL.to_string())
    }

    /// 是否為手動批次
    pub fn is_manual(&self) -> bool {
        self.expiry_key.is_unknown()
    }
}
