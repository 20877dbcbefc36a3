//! 物料主檔模型

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料主檔記錄（外部提供，核心唯讀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// 物料ID（目錄代碼）
    pub item_id: String,

    /// 商品描述
    pub description: String,

    /// 類別（試劑/校準品/質控/耗材）
    pub category: String,

    /// 包裝規格
    #[serde(default)]
    pub package: Option<String>,

    /// 每月實際測試數
    #[serde(default)]
    pub tests_per_month: Option<Decimal>,

    /// 每盒測試數
    #[serde(default)]
    pub tests_per_box: Option<Decimal>,

    /// 預估每月用量（盒）
    #[serde(default)]
    pub estimated_boxes_per_month: Option<Decimal>,
}

impl CatalogRecord {
    /// 創建新的主檔記錄
    pub fn new(item_id: String, description: String, category: String) -> Self {
        Self {
            item_id,
            description,
            category,
            package: None,
            tests_per_month: None,
            tests_per_box: None,
            estimated_boxes_per_month: None,
        }
    }

    /// 建構器模式：設置測試量
    pub fn with_test_volume(mut self, tests_per_month: Decimal, tests_per_box: Decimal) -> Self {
        self.tests_per_month = Some(tests_per_month);
        self.tests_per_box = Some(tests_per_box);
        self
    }

    /// 建構器模式：設置預估月用量
    pub fn with_estimated_boxes_per_month(mut self, boxes: Decimal) -> Self {
        self.estimated_boxes_per_month = Some(boxes);
        self
    }

    /// 建構器模式：設置包裝規格
    pub fn with_package(mut self, package: String) -> Self {
        self.package = Some(package);
        self
    }

    /// 是否為校準品
    pub fn is_calibrator(&self) -> bool {
        self.category.to_uppercase().contains("CAL")
    }

    /// 顯示標籤：`描述 [代碼]`
    pub fn label(&self) -> String {
        format!("{} [{}]", self.description, self.item_id)
    }

    /// 不區分大小寫比對描述或代碼
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.description.to_lowercase().contains(&term)
            || self.item_id.to_lowercase().contains(&term)
    }
}

/// 物料主檔
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: BTreeMap<String, CatalogRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由記錄建立主檔；代碼重複時以後者為準
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        records.into_iter().collect()
    }

    /// 新增或覆蓋記錄
    pub fn insert(&mut self, record: CatalogRecord) {
        self.records.insert(record.item_id.clone(), record);
    }

    pub fn get(&self, item_id: &str) -> Option<&CatalogRecord> {
        self.records.get(item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.records.contains_key(item_id)
    }

    /// 報表用描述，找不到時回傳代碼
    pub fn description_or_code(&self, item_id: &str) -> String {
        self.get(item_id)
            .map(|r| r.description.clone())
            .unwrap_or_else(|| item_id.to_string())
    }

    /// 搜尋描述或代碼
    pub fn search<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a CatalogRecord> + 'a {
        self.records.values().filter(move |r| r.matches(term))
    }

    /// 依代碼順序遍歷
    pub fn records(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CatalogRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogRecord>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_catalog() -> Catalog {
        Catalog::from_records(vec![
            CatalogRecord::new("7D75".to_string(), "Urea Nitrogen".to_string(), "RGT".to_string()),
            CatalogRecord::new("8P57".to_string(), "Glucose".to_string(), "Rgt".to_string()),
            CatalogRecord::new(
                "1E65".to_string(),
                "Multiconstituent Calibrator".to_string(),
                "Cal".to_string(),
            ),
        ])
    }

    #[rstest]
    #[case("CAL", true)]
    #[case("cal", true)]
    #[case("Calibratore", true)]
    #[case("RGT", false)]
    #[case("QC", false)]
    #[case("", false)]
    fn test_is_calibrator(#[case] category: &str, #[case] expected: bool) {
        let record = CatalogRecord::new("X".to_string(), "X".to_string(), category.to_string());
        assert_eq!(record.is_calibrator(), expected);
    }

    #[test]
    fn test_label() {
        let record =
            CatalogRecord::new("8P57".to_string(), "Glucose".to_string(), "RGT".to_string());
        assert_eq!(record.label(), "Glucose [8P57]");
    }

    #[test]
    fn test_search_description_and_code() {
        let catalog = sample_catalog();

        let hits: Vec<_> = catalog.search("urea").map(|r| r.item_id.as_str()).collect();
        assert_eq!(hits, vec!["7D75"]);

        let hits: Vec<_> = catalog.search("8p5").map(|r| r.item_id.as_str()).collect();
        assert_eq!(hits, vec!["8P57"]);

        assert_eq!(catalog.search("").count(), 3);
    }

    #[test]
    fn test_description_fallback() {
        let catalog = sample_catalog();
        assert_eq!(catalog.description_or_code("8P57"), "Glucose");
        assert_eq!(catalog.description_or_code("ZZZZ"), "ZZZZ");
    }

    #[test]
    fn test_deserialize_with_numeric_signals() {
        let json = r#"{
            "item_id": "8P57",
            "description": "Glucose",
            "category": "RGT",
            "tests_per_month": 2000,
            "tests_per_box": 100
        }"#;
        let record: CatalogRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.tests_per_month, Some(Decimal::from(2000)));
        assert_eq!(record.tests_per_box, Some(Decimal::from(100)));
        assert_eq!(record.estimated_boxes_per_month, None);
    }
}
