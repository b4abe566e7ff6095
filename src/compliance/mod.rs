//! DPDP Act 2023 Compliance Core
//!
//! このモジュールは、DPDP法（インド デジタル個人データ保護法 2023）の
//! 「通知 → 目的別の同意」要件に沿った同意管理の中核を提供します。
//!
//! ## 主要機能
//!
//! - **同意状態**: 目的ごとの同意フラグ。必須目的は常に同意済みで切り替え不可
//! - **監査ログ**: 追記専用・時系列順の同意イベント記録
//! - **同意レシート**: 送信時点の同意状態を固定した不変スナップショット
//! - **チェックリスト**: §5/§6 の充足状況（派生ビュー）
//!
//! ## 使用例
//!
//! ```rust
//! use dpdp_consent::catalog::Catalog;
//! use dpdp_consent::compliance::{ConsentState, ReceiptIssuer, ReceiptRequest};
//! use std::sync::Arc;
//!
//! let mut consent = ConsentState::new(Arc::new(Catalog::dpdp_default()));
//! consent.toggle("analytics");
//!
//! let mut issuer = ReceiptIssuer::new("DataSeva Platform Pvt. Ltd.");
//! let receipt = issuer.issue(
//!     ReceiptRequest {
//!         persona_id: "student",
//!         language_code: "en",
//!         notice_text: "DATA COLLECTION NOTICE",
//!         translated: false,
//!     },
//!     &consent,
//! );
//! assert_eq!(receipt.granted_purposes(), ["account", "service", "analytics"]);
//! ```

pub mod audit_log;
pub mod checklist;
pub mod consent_state;
pub mod receipt;

pub use audit_log::{AuditEntry, AuditKind, AuditLog};
pub use checklist::{ChecklistInput, ChecklistItem};
pub use consent_state::{ConsentRecord, ConsentState, PurposeGrant};
pub use receipt::{Receipt, ReceiptIssuer, ReceiptRequest, ReceiptStatus, LAWFUL_BASIS_STATEMENT};
