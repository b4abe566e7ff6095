//! 同意監査ログ
//! 同意・撤回に関わるイベントの追記専用記録

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 監査ログエントリの種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AuditKind {
    /// 通知生成・翻訳・同意付与など
    Consent,
    /// 同意撤回
    Revoke,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditKind::Consent => write!(f, "CONSENT"),
            AuditKind::Revoke => write!(f, "REVOKE"),
        }
    }
}

/// 監査ログエントリ（追記後は不変）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    /// 追記順の通し番号（0始まり）
    pub sequence: u64,
    pub kind: AuditKind,
    pub message: String,
    /// タイムスタンプ（UTC）
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.kind,
            self.message
        )
    }
}

/// 追記専用の監査ログ
///
/// 内部の格納順は常に作成順（時系列）です。表示用の `recent_first` は逆順を返しますが、
/// エクスポートは必ず時系列で行います。
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// エントリを追記
    pub fn append(&mut self, kind: AuditKind, message: impl Into<String>) -> &AuditEntry {
        let entry = AuditEntry {
            sequence: self.entries.len() as u64,
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        };
        tracing::debug!(kind = %entry.kind, sequence = entry.sequence, "Audit entry appended");

        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// 時系列順の全エントリ
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// 新しい順（表示用）
    pub fn recent_first(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().rev()
    }

    /// 最新のエントリ
    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// 種別ごとの件数
    pub fn count(&self, kind: AuditKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 時系列順のJSON配列としてエクスポート
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// 1行1レコードのJSON Linesとしてエクスポート
    pub fn export_jsonl(&self) -> Result<String> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = AuditLog::new();
        log.append(AuditKind::Consent, "first");
        log.append(AuditKind::Consent, "second");
        log.append(AuditKind::Revoke, "third");

        let messages: Vec<&str> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert!(log
            .entries()
            .windows(2)
            .all(|w| w[0].sequence < w[1].sequence && w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_recent_first_is_reverse() {
        let mut log = AuditLog::new();
        for i in 1..=5 {
            log.append(AuditKind::Consent, format!("op {}", i));
        }

        // K番目（1始まり）は (N-K+1) 番目の操作
        let n = log.len();
        for (k, entry) in log.recent_first().enumerate() {
            let k = k + 1;
            assert_eq!(entry.message, format!("op {}", n - k + 1));
        }
    }

    #[test]
    fn test_count_by_kind() {
        let mut log = AuditLog::new();
        log.append(AuditKind::Consent, "a");
        log.append(AuditKind::Revoke, "b");
        assert_eq!(log.count(AuditKind::Consent), 1);
        assert_eq!(log.count(AuditKind::Revoke), 1);
        assert_eq!(log.last().unwrap().kind, AuditKind::Revoke);
    }

    #[test]
    fn test_export_jsonl_is_chronological() {
        let mut log = AuditLog::new();
        log.append(AuditKind::Consent, "generated");
        log.append(AuditKind::Revoke, "revoked");

        let exported = log.export_jsonl().unwrap();
        let parsed: Vec<AuditEntry> = exported
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed, log.entries());

        let json: Vec<AuditEntry> = serde_json::from_str(&log.export_json().unwrap()).unwrap();
        assert_eq!(json[0].message, "generated");
    }
}
