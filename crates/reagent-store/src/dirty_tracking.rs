//! 本次工作階段內異動過的物料

use std::collections::BTreeSet;

/// 異動追蹤器
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    changed_items: BTreeSet<String>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記物料已異動
    pub fn mark(&mut self, item_id: &str) {
        if !self.changed_items.contains(item_id) {
            self.changed_items.insert(item_id.to_string());
        }
    }

    pub fn is_dirty(&self, item_id: &str) -> bool {
        self.changed_items.contains(item_id)
    }

    /// 重新載入後清除
    pub fn clear(&mut self) {
        self.changed_items.clear();
    }

    /// 已異動物料（依代碼排序）
    pub fn changed_items(&self) -> Vec<String> {
        self.changed_items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.changed_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_items.is_empty()
    }
}
