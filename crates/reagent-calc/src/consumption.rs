//! 月用量估算

use reagent_core::CatalogRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 月用量來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumptionSource {
    /// 實際測試量 ÷ 每盒測試數
    TestVolume,
    /// 預估每月盒數
    Estimated,
    /// 無可用資料
    Unknown,
}

/// 月用量估算結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumptionEstimate {
    /// 每月盒數
    pub boxes_per_month: Decimal,
    pub source: ConsumptionSource,
}

impl ConsumptionEstimate {
    pub fn is_known(&self) -> bool {
        self.boxes_per_month > Decimal::ZERO
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// 月用量估算器
pub struct ConsumptionEstimator;

impl ConsumptionEstimator {
    /// 估算月用量
    ///
    /// 實際測試量優先；缺少時退回預估盒數；都沒有則為 0。
    pub fn estimate(record: &CatalogRecord) -> ConsumptionEstimate {
        if let (Some(tests), Some(per_box)) = (
            positive(record.tests_per_month),
            positive(record.tests_per_box),
        ) {
            return ConsumptionEstimate {
                boxes_per_month: tests / per_box,
                source: ConsumptionSource::TestVolume,
            };
        }

        if let Some(boxes) = positive(record.estimated_boxes_per_month) {
            return ConsumptionEstimate {
                boxes_per_month: boxes,
                source: ConsumptionSource::Estimated,
            };
        }

        ConsumptionEstimate {
            boxes_per_month: Decimal::ZERO,
            source: ConsumptionSource::Unknown,
        }
    }
}

/// 每月盒數（無資料時為 0）
pub fn monthly_consumption(record: &CatalogRecord) -> Decimal {
    ConsumptionEstimator::estimate(record).boxes_per_month
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record() -> CatalogRecord {
        CatalogRecord::new("8P57".to_string(), "Glucose".to_string(), "RGT".to_string())
    }

    #[test]
    fn test_test_volume_preferred() {
        let record = record()
            .with_test_volume(Decimal::from(2000), Decimal::from(100))
            .with_estimated_boxes_per_month(Decimal::from(5));

        let estimate = ConsumptionEstimator::estimate(&record);

        assert_eq!(estimate.boxes_per_month, Decimal::from(20));
        assert_eq!(estimate.source, ConsumptionSource::TestVolume);
    }

    #[rstest]
    #[case(Some(0), Some(100))]
    #[case(Some(2000), Some(0))]
    #[case(None, Some(100))]
    #[case(Some(2000), None)]
    #[case(Some(-5), Some(100))]
    fn test_falls_back_to_estimate(#[case] tests: Option<i64>, #[case] per_box: Option<i64>) {
        let mut record = record().with_estimated_boxes_per_month(Decimal::new(35, 1));
        record.tests_per_month = tests.map(Decimal::from);
        record.tests_per_box = per_box.map(Decimal::from);

        let estimate = ConsumptionEstimator::estimate(&record);

        assert_eq!(estimate.boxes_per_month, Decimal::new(35, 1));
        assert_eq!(estimate.source, ConsumptionSource::Estimated);
    }

    #[test]
    fn test_unknown_when_no_signal() {
        let estimate = ConsumptionEstimator::estimate(&record());
        assert_eq!(estimate.boxes_per_month, Decimal::ZERO);
        assert_eq!(estimate.source, ConsumptionSource::Unknown);
        assert!(!estimate.is_known());
    }

    #[test]
    fn test_fractional_ratio() {
        let record = record().with_test_volume(Decimal::from(250), Decimal::from(100));
        assert_eq!(monthly_consumption(&record), Decimal::new(25, 1));
    }
}
