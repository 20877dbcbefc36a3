//! 效期鍵（年-月）

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::StockError;

/// 效期排序鍵
///
/// 以 `YYYY-MM` 文字持久化，字典序與時間順序一致。
/// `NO_EXPIRY`（`9999-12`）表示效期未知，永遠排在最後。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpiryKey {
    year: u16,
    month: u8,
}

impl ExpiryKey {
    /// 效期未知的哨兵值
    pub const NO_EXPIRY: ExpiryKey = ExpiryKey {
        year: 9999,
        month: 12,
    };

    /// 創建新的效期鍵
    pub fn new(year: u16, month: u8) -> crate::Result<Self> {
        if !(1..=12).contains(&month) || year > 9999 {
            return Err(StockError::InvalidExpiry(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// 取日期所在的月份
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(0, 9999) as u16,
            month: date.month() as u8,
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// 是否為效期未知
    pub fn is_unknown(&self) -> bool {
        *self == Self::NO_EXPIRY
    }

    /// 往後推算月份
    pub fn add_months(&self, months: u32) -> Self {
        let index = self.year as u32 * 12 + (self.month as u32 - 1) + months;
        let year = (index / 12).min(9999) as u16;
        let month = if index / 12 > 9999 { 12 } else { (index % 12 + 1) as u8 };
        Self { year, month }
    }

    /// 顯示用標籤（MM/YYYY）
    pub fn display_label(&self) -> String {
        format!("{:02}/{:04}", self.month, self.year)
    }
}

impl fmt::Display for ExpiryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ExpiryKey {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StockError::InvalidExpiry(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<u16>().map_err(|_| invalid())?;
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for ExpiryKey {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExpiryKey> for String {
    fn from(key: ExpiryKey) -> Self {
        key.to_string()
    }
}
