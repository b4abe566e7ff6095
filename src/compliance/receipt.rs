//! Consent Receipt
//!
//! 同意送信時点の同意状態を固定した不変の記録。作成後に変化し得るのは `status` のみです。

use super::consent_state::ConsentState;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// 同意の根拠に関する定型文（§6(1)）
pub const LAWFUL_BASIS_STATEMENT: &str =
    "Freely given, specific, informed, unambiguous - DPDP Act 2023 §6(1)";

/// IST（UTC+05:30）のオフセット秒
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// レシートの状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReceiptStatus {
    Active,
    Revoked,
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptStatus::Active => write!(f, "ACTIVE"),
            ReceiptStatus::Revoked => write!(f, "REVOKED"),
        }
    }
}

/// 同意レシート
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    receipt_id: String,
    fiduciary_name: String,
    persona_id: String,
    language_code: String,
    timestamp: DateTime<Utc>,
    granted_purposes: Vec<String>,
    declined_purposes: Vec<String>,
    lawful_basis_statement: String,
    /// 送信時に表示されていた通知文の SHA-256
    notice_digest: String,
    /// 翻訳済み通知が表示されていたか
    translated: bool,
    status: ReceiptStatus,
    revoked_at: Option<DateTime<Utc>>,
}

impl Receipt {
    pub fn id(&self) -> &str {
        &self.receipt_id
    }

    pub fn fiduciary_name(&self) -> &str {
        &self.fiduciary_name
    }

    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// タイムスタンプをIST表記で取得
    pub fn timestamp_ist(&self) -> String {
        match FixedOffset::east_opt(IST_OFFSET_SECS) {
            Some(ist) => self
                .timestamp
                .with_timezone(&ist)
                .format("%d/%m/%Y, %H:%M:%S IST")
                .to_string(),
            None => self.timestamp.to_rfc3339(),
        }
    }

    /// 同意済み目的ID（カタログ順）
    pub fn granted_purposes(&self) -> &[String] {
        &self.granted_purposes
    }

    /// 拒否された目的ID（カタログ順）
    pub fn declined_purposes(&self) -> &[String] {
        &self.declined_purposes
    }

    pub fn lawful_basis_statement(&self) -> &str {
        &self.lawful_basis_statement
    }

    pub fn notice_digest(&self) -> &str {
        &self.notice_digest
    }

    pub fn translated(&self) -> bool {
        self.translated
    }

    pub fn status(&self) -> ReceiptStatus {
        self.status
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    pub fn is_revoked(&self) -> bool {
        self.status == ReceiptStatus::Revoked
    }

    /// Active → Revoked（一度だけ）。遷移した場合に `true`
    pub(crate) fn mark_revoked(&mut self) -> bool {
        if self.status == ReceiptStatus::Revoked {
            return false;
        }
        self.status = ReceiptStatus::Revoked;
        self.revoked_at = Some(Utc::now());
        true
    }
}

/// レシート発行に必要なセッション情報
#[derive(Debug, Clone)]
pub struct ReceiptRequest<'a> {
    pub persona_id: &'a str,
    pub language_code: &'a str,
    pub notice_text: &'a str,
    pub translated: bool,
}

/// レシート発行者
///
/// セッション内で発行したIDを記憶し、衝突した場合は再生成します。
#[derive(Debug, Clone)]
pub struct ReceiptIssuer {
    fiduciary_name: String,
    issued: HashSet<String>,
}

impl ReceiptIssuer {
    pub fn new(fiduciary_name: impl Into<String>) -> Self {
        Self {
            fiduciary_name: fiduciary_name.into(),
            issued: HashSet::new(),
        }
    }

    pub fn fiduciary_name(&self) -> &str {
        &self.fiduciary_name
    }

    /// 現在の同意状態からレシートを発行
    pub fn issue(&mut self, request: ReceiptRequest<'_>, consent: &ConsentState) -> Receipt {
        let receipt_id = self.next_id();
        let granted_purposes = consent
            .granted_purposes()
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        let declined_purposes = consent
            .declined_purposes()
            .into_iter()
            .map(|p| p.id.clone())
            .collect();

        Receipt {
            receipt_id,
            fiduciary_name: self.fiduciary_name.clone(),
            persona_id: request.persona_id.to_string(),
            language_code: request.language_code.to_string(),
            timestamp: Utc::now(),
            granted_purposes,
            declined_purposes,
            lawful_basis_statement: LAWFUL_BASIS_STATEMENT.to_string(),
            notice_digest: notice_digest(request.notice_text),
            translated: request.translated,
            status: ReceiptStatus::Active,
            revoked_at: None,
        }
    }

    /// このセッションで発行済みのID数
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    fn next_id(&mut self) -> String {
        loop {
            let candidate = generate_receipt_id(Utc::now());
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            tracing::warn!(receipt_id = %candidate, "Receipt id collision, redrawing");
        }
    }
}

/// `DPDP-<base36 millis>-<uuid v4 先頭8桁>` 形式のID
fn generate_receipt_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let entropy = Uuid::new_v4().simple().to_string();
    format!(
        "DPDP-{}-{}",
        to_base36(millis),
        entropy[..8].to_ascii_uppercase()
    )
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

/// 通知文の SHA-256（16進）
pub fn notice_digest(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
