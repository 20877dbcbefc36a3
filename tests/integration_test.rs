//! 集成測試

use chrono::NaiveDate;
use reagent::*;
use reagent_calc::export::{write_expiry_csv, write_reorder_csv};
use reagent_core::{ActivityAction, ReorderPolicy};
use rust_decimal::Decimal;
use rstest::rstest;

fn lab_catalog() -> Catalog {
    Catalog::from_records(vec![
        CatalogRecord::new("8P57".to_string(), "Glucose".to_string(), "RGT".to_string())
            .with_test_volume(Decimal::from(2000), Decimal::from(100)),
        CatalogRecord::new("7D75".to_string(), "Urea Nitrogen".to_string(), "Rgt".to_string())
            .with_estimated_boxes_per_month(Decimal::from(4)),
        CatalogRecord::new(
            "1E65".to_string(),
            "Multiconstituent Calibrator".to_string(),
            "CAL".to_string(),
        ),
        CatalogRecord::new("9Q01".to_string(), "Sample Cups".to_string(), "CONS".to_string()),
    ])
}

fn key(text: &str) -> ExpiryKey {
    text.parse().unwrap()
}

fn new_service() -> LedgerService<InMemoryStore> {
    reagent::logging::init_test();
    LedgerService::load(InMemoryStore::new(), lab_catalog(), StockConfig::default()).unwrap()
}

#[test]
fn test_receive_creates_entry() {
    let mut service = new_service();
    assert!(service.ledger().get("8P57").is_none());

    service.receive("8P57", 10, key("2026-05")).unwrap();

    let entry = service.ledger().get("8P57").unwrap();
    assert_eq!(entry.total_quantity, 10);
    assert_eq!(entry.batches, vec![Batch::dated(10, key("2026-05"))]);
}

#[test]
fn test_withdraw_fifo_and_rejection() {
    let mut service = new_service();
    service.receive("8P57", 5, key("2026-06")).unwrap();
    service.receive("8P57", 5, key("2026-01")).unwrap();

    let err = service.withdraw("8P57", 11).unwrap_err();
    assert!(matches!(
        err,
        StockError::InsufficientStock {
            requested: 11,
            available: 10,
            ..
        }
    ));
    assert_eq!(service.stock_of("8P57"), 10);

    service.withdraw("8P57", 7).unwrap();

    let entry = service.ledger().get("8P57").unwrap();
    assert_eq!(entry.total_quantity, 3);
    assert_eq!(entry.batches, vec![Batch::dated(3, key("2026-06"))]);
}

#[test]
fn test_adjust_up_and_idempotent() {
    let mut service = new_service();
    service.receive("1E65", 4, key("2027-03")).unwrap();

    let first = service.adjust("1E65", 10).unwrap();
    let second = service.adjust("1E65", 10).unwrap();

    assert!(first.is_applied());
    assert_eq!(second, OperationOutcome::NoChangeNeeded);

    let entry = service.ledger().get("1E65").unwrap();
    assert_eq!(entry.total_quantity, 10);
    assert_eq!(entry.batches.last(), Some(&Batch::manual(6)));

    let actions: Vec<_> = service.activity().recent().map(|e| e.action).collect();
    assert_eq!(actions, vec![ActivityAction::Adjust, ActivityAction::Receive]);
}

#[test]
fn test_reorder_report_end_to_end() {
    let mut service = new_service();
    service.receive("8P57", 15, key("2027-01")).unwrap();
    service.receive("1E65", 2, key("2027-01")).unwrap();
    service.receive("7D75", 8, key("2027-01")).unwrap();

    let report = service.reorder_report();

    let glucose = report.line("8P57").unwrap();
    assert_eq!(glucose.target_stock, 30);
    assert_eq!(glucose.to_order, 15);
    assert_eq!(glucose.status, ReorderStatus::ReorderNeeded);

    let calibrator = report.line("1E65").unwrap();
    assert_eq!(calibrator.target_stock, 3);
    assert_eq!(calibrator.status, ReorderStatus::BelowMinimum);

    // 4 盒/月 × 1.5 = 6，庫存 8
    let urea = report.line("7D75").unwrap();
    assert_eq!(urea.to_order, 0);
    assert_eq!(urea.status, ReorderStatus::Ok);

    // 無用量資料的耗材：沒貨時仍為缺貨，有貨時僅供參考
    assert_eq!(report.line("9Q01").unwrap().status, ReorderStatus::OutOfStock);
    assert_eq!(report.lines[0].item_id, "8P57");

    service.receive("9Q01", 4, key("2027-06")).unwrap();
    let report = service.reorder_report();
    assert_eq!(report.line("9Q01").unwrap().status, ReorderStatus::Unknown);

    let mut buffer = Vec::new();
    write_reorder_csv(&mut buffer, report.filter_status(&[ReorderStatus::ReorderNeeded]))
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("REORDER_NEEDED,8P57,Glucose,15,30,15,0.75"));
}

// 月用量 20、庫存 15（覆蓋 0.75 個月）在不同緩衝設定下的狀態
#[rstest]
#[case(Decimal::ONE, Decimal::new(5, 1), true, 30, ReorderStatus::ReorderNeeded)]
#[case(Decimal::new(5, 1), Decimal::ONE, true, 30, ReorderStatus::Urgent)]
#[case(Decimal::ONE, Decimal::new(25, 2), true, 25, ReorderStatus::ReorderNeeded)]
#[case(Decimal::new(5, 1), Decimal::ONE, false, 30, ReorderStatus::ReorderNeeded)]
fn test_reorder_buffer_variants(
    #[case] coverage: Decimal,
    #[case] buffer: Decimal,
    #[case] urgent_tier: bool,
    #[case] target: u32,
    #[case] expected: ReorderStatus,
) {
    reagent::logging::init_test();
    let config = StockConfig::default().with_reorder(
        ReorderPolicy::default()
            .with_coverage_months(coverage)
            .with_safety_buffer_months(buffer)
            .with_urgent_tier(urgent_tier),
    );
    let mut service = LedgerService::load(InMemoryStore::new(), lab_catalog(), config).unwrap();
    service.receive("8P57", 15, key("2027-01")).unwrap();

    let report = service.reorder_report();
    let line = report.line("8P57").unwrap();

    assert_eq!(line.target_stock, target);
    assert_eq!(line.status, expected);
}

#[test]
fn test_expiry_report_end_to_end() {
    let mut service = new_service();
    service.receive("8P57", 2, key("2026-08")).unwrap();
    service.receive("8P57", 3, key("2026-12")).unwrap();
    service.receive("7D75", 4, key("2027-09")).unwrap();
    service.adjust("7D75", 6).unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let report = service.expiry_report(today);

    let statuses: Vec<_> = report
        .lines
        .iter()
        .map(|l| (l.expiry_label.as_str(), l.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("08/2026", ExpiryStatus::Expired),
            ("12/2026", ExpiryStatus::ExpiringSoon),
            ("09/2027", ExpiryStatus::Ok),
            ("MANUAL", ExpiryStatus::Ok),
        ]
    );

    let mut buffer = Vec::new();
    write_expiry_csv(&mut buffer, report.filter(ExpiryStatus::Expired)).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.ends_with("EXPIRED,8P57,Glucose,2,08/2026\n"));
}

#[test]
fn test_json_file_store_persists_between_sessions() {
    reagent::logging::init_test();
    let path = std::env::temp_dir().join(format!(
        "reagent-integration-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut service =
            LedgerService::load(JsonFileStore::new(&path), lab_catalog(), StockConfig::default())
                .unwrap();
        service.receive("8P57", 5, key("2026-01")).unwrap();
        service.receive("8P57", 5, key("2026-06")).unwrap();
        service.withdraw("8P57", 7).unwrap();
    }

    let service =
        LedgerService::load(JsonFileStore::new(&path), lab_catalog(), StockConfig::default())
            .unwrap();
    let entry = service.ledger().get("8P57").unwrap();
    assert_eq!(entry.total_quantity, 3);
    assert_eq!(entry.batches, vec![Batch::dated(3, key("2026-06"))]);
    assert!(service.load_warnings().is_empty());

    let text = std::fs::read_to_string(&path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["rows"][0]["quantity"], 3);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_two_sessions_conflict() {
    reagent::logging::init_test();
    let path = std::env::temp_dir().join(format!(
        "reagent-conflict-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let mut first =
        LedgerService::load(JsonFileStore::new(&path), lab_catalog(), StockConfig::default())
            .unwrap();
    let mut second =
        LedgerService::load(JsonFileStore::new(&path), lab_catalog(), StockConfig::default())
            .unwrap();

    first.receive("8P57", 5, key("2026-01")).unwrap();
    let err = second.receive("7D75", 2, key("2026-01")).unwrap_err();
    assert!(matches!(err, StockError::StaleWriteConflict { .. }));

    second.reload().unwrap();
    second.receive("7D75", 2, key("2026-01")).unwrap();
    assert_eq!(second.stock_of("8P57"), 5);
    assert_eq!(second.stock_of("7D75"), 2);

    let _ = std::fs::remove_file(&path);
}
