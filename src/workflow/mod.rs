//! Consent Wizard Workflow
//!
//! 3ステップ（ペルソナと通知 → 同意 → レシート）のウィザードを駆動します。
//!
//! - [`step`]: 純粋なステップ遷移関数
//! - [`notice`]: 通知文の生成・翻訳リクエストの状態管理（同時に1件のみ）
//! - [`prompt`]: テキスト生成コラボレーター向けプロンプト
//! - [`session`]: 上記と同意状態・監査ログ・レシートをまとめたセッション
//!
//! ## 使用例
//!
//! ```rust
//! use dpdp_consent::catalog::Catalog;
//! use dpdp_consent::llm::LlmResponse;
//! use dpdp_consent::workflow::{ConsentSession, Step};
//! use std::sync::Arc;
//!
//! let mut session = ConsentSession::new(Arc::new(Catalog::dpdp_default()), "DataSeva Platform Pvt. Ltd.");
//! session.select_persona("student").unwrap();
//!
//! let command = session.begin_generate().unwrap();
//! session
//!     .complete_generate(&command.ticket, Ok(LlmResponse::text("DATA COLLECTION NOTICE", "llama")))
//!     .unwrap();
//!
//! assert!(session.proceed_to_consent());
//! session.toggle_consent("analytics");
//! let receipt = session.submit_consent().unwrap();
//! assert_eq!(receipt.granted_purposes(), ["account", "service", "analytics"]);
//! assert_eq!(session.step(), Step::Receipt);
//! ```

pub mod notice;
pub mod prompt;
pub mod session;
pub mod step;

pub use notice::{
    CredentialState, NoticeCommand, NoticeWorkflow, RequestFailure, RequestKind, RequestStatus,
    RequestTicket, Translation,
};
pub use session::{ConsentSession, SessionSnapshot};
pub use step::{Step, StepEvent, StepGuard, StepMachine};
