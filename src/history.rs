//! 解析履歴ストア
//!
//! 保存スロット（JSONファイル1つ）に履歴リスト全体を書き込む。
//! add/remove は新しいリストを返すだけで、永続化は呼び出し側が persist で行う。
//! ロックはしないため、同じ元リストから派生した書き込みが競合すると後勝ちになる

use crate::config::Config;
use crate::error::Result;
use care_label_common::{CareAnalysis, HistoryEntry};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.history_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存済みの履歴を読み込む（未保存・破損時は空）
    pub fn load(&self) -> Vec<HistoryEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "history unreadable, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "history corrupted, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// 先頭に追加した新しいリスト
    pub fn add(entry: HistoryEntry, current: &[HistoryEntry]) -> Vec<HistoryEntry> {
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(entry);
        next.extend_from_slice(current);
        next
    }

    /// 指定IDを除いた新しいリスト（該当なしなら同じ内容）
    pub fn remove(id: &str, current: &[HistoryEntry]) -> Vec<HistoryEntry> {
        current.iter().filter(|e| e.id != id).cloned().collect()
    }

    pub fn find<'a>(id: &str, current: &'a [HistoryEntry]) -> Option<&'a HistoryEntry> {
        current.iter().find(|e| e.id == id)
    }

    /// リスト全体で保存スロットを上書き
    pub fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, entries)?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "history persisted");
        Ok(())
    }
}

/// 成功結果と元画像から履歴エントリを作成
///
/// タイムスタンプは既存の最新エントリより過去にならないよう補正する
pub fn snapshot(analysis: &CareAnalysis, image_preview: &str, current: &[HistoryEntry]) -> HistoryEntry {
    let now = chrono::Utc::now().timestamp_millis();
    let newest = current.iter().map(|e| e.timestamp).max().unwrap_or(now);
    HistoryEntry::new(
        uuid::Uuid::new_v4().to_string(),
        now.max(newest),
        image_preview.to_string(),
        analysis,
    )
}
