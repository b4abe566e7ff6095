//! テキスト生成コラボレーター
//!
//! このモジュールは、通知文の生成・翻訳に使うOpenAI互換のテキスト生成サービス
//! （Groq、OpenAI、カスタムエンドポイント）との接続を提供します。

pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use client::LlmClient;
pub use config::{LlmConfig, LlmProvider};
pub use error::{LlmError, LlmResult};
pub use providers::TextGenerator;
pub use types::{LlmRequest, LlmResponse, Message, Role};
