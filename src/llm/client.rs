//! テキスト生成クライアント

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    providers::{create_provider, TextGenerator},
    types::{LlmRequest, LlmResponse},
};
use async_trait::async_trait;

/// テキスト生成クライアント
///
/// 設定から構築したプロバイダーへ処理を委譲します。
pub struct LlmClient {
    provider: Box<dyn TextGenerator>,
}

impl LlmClient {
    /// 新しいクライアントを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let provider = create_provider(&config)?;
        tracing::debug!(provider = %provider.name(), "Text generator created");
        Ok(Self::with_provider(provider))
    }

    /// 既存のプロバイダーからクライアントを作成
    pub fn with_provider(provider: Box<dyn TextGenerator>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        self.provider.generate(request).await
    }

    fn name(&self) -> String {
        self.provider.name()
    }
}
