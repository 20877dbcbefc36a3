//! 日誌初始化

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日誌系統
///
/// 日誌等級由 `RUST_LOG` 控制（預設 info），例如 `RUST_LOG=reagent_store=debug`。
/// 重複呼叫不會出錯。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// 測試用日誌（debug 等級，輸出至測試擷取）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
