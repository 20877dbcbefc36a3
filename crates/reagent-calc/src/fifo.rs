//! 先到期先出（FIFO）扣減

use reagent_core::Batch;

/// 依批次順序扣減數量，回傳未能扣減的剩餘量
///
/// 批次數量小於等於剩餘量時整批移除；否則原位扣減並保留。
/// 呼叫前批次須已依效期遞增排序。
pub fn consume_fifo(batches: &mut Vec<Batch>, amount: u32) -> u32 {
    let mut remaining = amount;

    batches.retain_mut(|batch| {
        if remaining == 0 {
            return true;
        }
        if batch.quantity > remaining {
            batch.quantity -= remaining;
            remaining = 0;
            true
        } else {
            remaining -= batch.quantity;
            false
        }
    });

    remaining
}
