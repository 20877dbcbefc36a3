//! 簡單庫存異動示例

use reagent::*;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    reagent::logging::init();

    println!("=== 簡單庫存異動示例 ===\n");

    let catalog = Catalog::from_records(vec![CatalogRecord::new(
        "8P57".to_string(),
        "Glucose Reagent Kit".to_string(),
        "RGT".to_string(),
    )
    .with_test_volume(Decimal::from(2000), Decimal::from(100))]);

    let mut service = LedgerService::load(InMemoryStore::new(), catalog, StockConfig::default())?;

    // 兩批不同效期的收貨
    service.receive("8P57", 5, "2026-06".parse()?)?;
    service.receive("8P57", 5, "2026-01".parse()?)?;

    // 領用優先扣除最早到期的批次
    service.withdraw("8P57", 7)?;

    // 超過庫存的領用會被拒絕，帳本不變
    if let Err(err) = service.withdraw("8P57", 10) {
        tracing::warn!("領用失敗: {}", err);
    }

    // 盤點調高，差額記為 MANUAL 批次
    service.adjust("8P57", 6)?;

    if let Some(entry) = service.ledger().get("8P57") {
        println!("物料 {} 總量 {}", entry.item_id, entry.total_quantity);
        for batch in &entry.batches {
            println!("  - 批次 {}: {}", batch.expiry_label, batch.quantity);
        }
    }

    println!("\n最近異動:");
    for entry in service.recent_activity() {
        println!(
            "  {} {} {} ({})",
            entry.timestamp.format("%m/%d %H:%M"),
            entry.action,
            entry.item_label,
            entry.quantity
        );
    }

    Ok(())
}
