//! 帳本儲存介面與實作

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reagent_core::StockError;
use serde::{Deserialize, Serialize};

use crate::snapshot::{SnapshotRow, SnapshotVersion, StoredSnapshot};

/// 帳本儲存（外部表格服務的抽象）
///
/// 讀取不做快取；寫入為整份快照覆蓋。
pub trait LedgerStore {
    /// 讀取目前的快照與版本
    fn fetch(&self) -> reagent_core::Result<StoredSnapshot>;

    /// 寫入整份快照，回傳新版本
    ///
    /// 遠端版本與 `expected` 不同時回傳 `StaleWriteConflict`（啟用版本檢查時）。
    fn store(
        &mut self,
        rows: Vec<SnapshotRow>,
        expected: SnapshotVersion,
    ) -> reagent_core::Result<SnapshotVersion>;
}

fn check_version(
    enabled: bool,
    expected: SnapshotVersion,
    found: SnapshotVersion,
) -> reagent_core::Result<()> {
    if enabled && expected != found {
        return Err(StockError::StaleWriteConflict {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

/// 記憶體儲存（測試與單機使用）
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    rows: Vec<SnapshotRow>,
    version: SnapshotVersion,
    version_check: bool,
    failing_writes: usize,
    unavailable: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            version: SnapshotVersion::initial(),
            version_check: true,
            failing_writes: 0,
            unavailable: false,
        }
    }

    /// 建構器模式：預先放入資料列
    pub fn with_rows(mut self, rows: Vec<SnapshotRow>) -> Self {
        self.rows = rows;
        self.version = SnapshotVersion::next();
        self
    }

    /// 建構器模式：關閉版本檢查（後寫者覆蓋）
    pub fn last_writer_wins(mut self) -> Self {
        self.version_check = false;
        self
    }

    /// 接下來的 `count` 次寫入失敗
    pub fn fail_next_writes(&mut self, count: usize) {
        self.failing_writes = count;
    }

    /// 模擬服務中斷
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// 模擬其他程序寫入
    pub fn overwrite_remotely(&mut self, rows: Vec<SnapshotRow>) {
        self.rows = rows;
        self.version = SnapshotVersion::next();
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryStore {
    fn fetch(&self) -> reagent_core::Result<StoredSnapshot> {
        if self.unavailable {
            return Err(StockError::StoreUnavailable("記憶體儲存已停用".to_string()));
        }
        Ok(StoredSnapshot {
            rows: self.rows.clone(),
            version: self.version,
        })
    }

    fn store(
        &mut self,
        rows: Vec<SnapshotRow>,
        expected: SnapshotVersion,
    ) -> reagent_core::Result<SnapshotVersion> {
        if self.unavailable {
            return Err(StockError::StoreUnavailable("記憶體儲存已停用".to_string()));
        }
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(StockError::StoreUnavailable("模擬寫入失敗".to_string()));
        }
        check_version(self.version_check, expected, self.version)?;

        self.rows = rows;
        self.version = SnapshotVersion::next();
        Ok(self.version)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: SnapshotVersion,
    rows: Vec<SnapshotRow>,
}

/// JSON 檔案儲存（單一文件存放版本與所有資料列）
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    version_check: bool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version_check: true,
        }
    }

    /// 建構器模式：關閉版本檢查（後寫者覆蓋）
    pub fn last_writer_wins(mut self) -> Self {
        self.version_check = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> reagent_core::Result<Option<StoreDocument>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StockError::StoreUnavailable(format!(
                "讀取 {} 失敗: {}",
                self.path.display(),
                err
            ))),
        }
    }
}

impl LedgerStore for JsonFileStore {
    fn fetch(&self) -> reagent_core::Result<StoredSnapshot> {
        Ok(match self.read_document()? {
            Some(doc) => StoredSnapshot {
                rows: doc.rows,
                version: doc.version,
            },
            None => StoredSnapshot::empty(),
        })
    }

    fn store(
        &mut self,
        rows: Vec<SnapshotRow>,
        expected: SnapshotVersion,
    ) -> reagent_core::Result<SnapshotVersion> {
        let found = self
            .read_document()?
            .map(|doc| doc.version)
            .unwrap_or_else(SnapshotVersion::initial);
        check_version(self.version_check, expected, found)?;

        let doc = StoreDocument {
            version: SnapshotVersion::next(),
            rows,
        };
        let text = serde_json::to_string_pretty(&doc)?;

        // 先寫暫存檔再更名，避免寫到一半的檔案
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, text)
            .and_then(|_| fs::rename(&tmp_path, &self.path))
            .map_err(|err| {
                StockError::StoreUnavailable(format!(
                    "寫入 {} 失敗: {}",
                    self.path.display(),
                    err
                ))
            })?;

        tracing::debug!("快照已寫入 {} (版本 {})", self.path.display(), doc.version);
        Ok(doc.version)
    }
}
