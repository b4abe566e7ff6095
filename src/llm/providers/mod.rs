//! テキスト生成プロバイダー実装

pub mod openai;

pub use openai::OpenAICompatibleProvider;

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    types::{LlmRequest, LlmResponse},
};
use async_trait::async_trait;

/// テキスト生成コラボレーター
///
/// 呼び出しのタイムアウトは実装側の責務です。リトライは行いません。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// テキストを生成
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;

    /// プロバイダー名を取得
    fn name(&self) -> String;
}

/// プロバイダーファクトリー
pub fn create_provider(config: &LlmConfig) -> LlmResult<Box<dyn TextGenerator>> {
    Ok(Box::new(OpenAICompatibleProvider::new(config.clone())?))
}
