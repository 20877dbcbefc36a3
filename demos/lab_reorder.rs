//! 實驗室補貨與效期報表示例
//!
//! 帳本寫入暫存目錄的 JSON 檔，報表以 CSV 輸出到標準輸出。

use chrono::Utc;
use reagent::*;
use reagent_calc::export::{write_expiry_csv, write_reorder_csv};
use reagent_core::ReorderPolicy;
use rust_decimal::Decimal;

fn lab_catalog() -> Catalog {
    Catalog::from_records(vec![
        CatalogRecord::new("8P57".to_string(), "Glucose".to_string(), "RGT".to_string())
            .with_test_volume(Decimal::from(2000), Decimal::from(100)),
        CatalogRecord::new("7D75".to_string(), "Urea Nitrogen".to_string(), "RGT".to_string())
            .with_estimated_boxes_per_month(Decimal::from(4)),
        CatalogRecord::new(
            "1E65".to_string(),
            "Multiconstituent Calibrator".to_string(),
            "CAL".to_string(),
        ),
        CatalogRecord::new("9Q01".to_string(), "Sample Cups".to_string(), "CONS".to_string()),
    ])
}

fn main() -> anyhow::Result<()> {
    reagent::logging::init();

    println!("=== 實驗室補貨報表示例 ===\n");

    let path = std::env::temp_dir().join("reagent-lab-demo.json");
    if path.exists() {
        std::fs::remove_file(&path)?;
    }

    let config = StockConfig::default().with_reorder(
        ReorderPolicy::default().with_safety_buffer_months(Decimal::new(5, 1)),
    );
    config.validate()?;

    let mut service = LedgerService::load(JsonFileStore::new(&path), lab_catalog(), config)?;

    service.receive("8P57", 10, "2026-08".parse()?)?;
    service.receive("8P57", 5, "2027-01".parse()?)?;
    service.receive("7D75", 8, "2027-03".parse()?)?;
    service.receive("1E65", 2, "2026-12".parse()?)?;

    let report = service.reorder_report();

    println!("補貨狀態統計:");
    for (status, count) in report.counts_by_status() {
        println!("  {}: {}", status.as_str(), count);
    }
    println!("建議訂購總量: {}\n", report.total_to_order());

    for warning in &report.warnings {
        tracing::warn!("{}: {}", warning.item_id, warning.message);
    }

    let attention = report
        .lines
        .iter()
        .filter(|line| line.status.needs_attention());
    write_reorder_csv(std::io::stdout(), attention)?;

    println!("\n效期報表:");
    let expiry = service.expiry_report(Utc::now().date_naive());
    write_expiry_csv(std::io::stdout(), &expiry.lines)?;

    println!("\n帳本檔案: {}", path.display());

    Ok(())
}
