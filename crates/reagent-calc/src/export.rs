//! 報表匯出（CSV）

use std::io::Write;

use reagent_core::StockError;

use crate::expiry_monitor::ExpiryLine;
use crate::reorder::ReorderLine;

fn csv_error(err: csv::Error) -> StockError {
    StockError::Serialization(err.to_string())
}

/// 匯出補貨建議
pub fn write_reorder_csv<'a, W, I>(writer: W, lines: I) -> reagent_core::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ReorderLine>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record([
            "status",
            "item_id",
            "description",
            "stock",
            "target",
            "to_order",
            "coverage_months",
        ])
        .map_err(csv_error)?;

    for line in lines {
        let coverage = line
            .coverage_months
            .map(|c| c.round_dp(2).to_string())
            .unwrap_or_default();
        csv_writer
            .write_record([
                line.status.as_str().to_string(),
                line.item_id.clone(),
                line.description.clone(),
                line.current_stock.to_string(),
                line.target_stock.to_string(),
                line.to_order.to_string(),
                coverage,
            ])
            .map_err(csv_error)?;
    }

    csv_writer
        .flush()
        .map_err(|e| StockError::Serialization(e.to_string()))
}

/// 匯出效期清單
pub fn write_expiry_csv<'a, W, I>(writer: W, lines: I) -> reagent_core::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ExpiryLine>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["status", "item_id", "description", "quantity", "expiry"])
        .map_err(csv_error)?;

    for line in lines {
        csv_writer
            .write_record([
                line.status.as_str().to_string(),
                line.item_id.clone(),
                line.description.clone(),
                line.quantity.to_string(),
                line.expiry_label.clone(),
            ])
            .map_err(csv_error)?;
    }

    csv_writer
        .flush()
        .map_err(|e| StockError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumption::ConsumptionSource;
    use crate::expiry_monitor::ExpiryStatus;
    use crate::reorder::ReorderStatus;
    use reagent_core::ExpiryKey;
    use rust_decimal::Decimal;

    #[test]
    fn test_reorder_csv() {
        let line = ReorderLine {
            item_id: "8P57".to_string(),
            description: "Glucose, 4x100".to_string(),
            is_calibrator: false,
            current_stock: 15,
            consumption: Decimal::from(20),
            consumption_source: ConsumptionSource::TestVolume,
            target_stock: 30,
            to_order: 15,
            coverage_months: Some(Decimal::new(75, 2)),
            status: ReorderStatus::ReorderNeeded,
        };

        let mut buffer = Vec::new();
        write_reorder_csv(&mut buffer, [&line]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], "status,item_id,description,stock,target,to_order,coverage_months");
        assert_eq!(rows[1], "REORDER_NEEDED,8P57,\"Glucose, 4x100\",15,30,15,0.75");
    }

    #[test]
    fn test_expiry_csv() {
        let line = ExpiryLine {
            item_id: "8P57".to_string(),
            description: "Glucose".to_string(),
            status: ExpiryStatus::Expired,
            quantity: 2,
            expiry_key: ExpiryKey::new(2026, 8).unwrap(),
            expiry_label: "08/2026".to_string(),
        };

        let mut buffer = Vec::new();
        write_expiry_csv(&mut buffer, [&line]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "status,item_id,description,quantity,expiry\nEXPIRED,8P57,Glucose,2,08/2026\n"
        );
    }
}
