//! テキスト生成の型定義

use serde::{Deserialize, Serialize};

/// メッセージのロール
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// システムメッセージ
    System,
    /// ユーザーメッセージ
    User,
}

/// チャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// メッセージのロール
    pub role: Role,
    /// メッセージ内容
    pub content: String,
}

impl Message {
    /// 新しいシステムメッセージを作成
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// 新しいユーザーメッセージを作成
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// テキスト生成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmRequest {
    /// メッセージ履歴
    pub messages: Vec<Message>,
    /// 使用するモデル（省略時は設定のデフォルト）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 温度パラメータ（0.0-2.0）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// 最大トークン数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

impl LlmRequest {
    /// 新しいリクエストを作成
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// モデルを設定
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// 温度を設定
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// 最大トークン数を設定
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// 最後のユーザーメッセージ
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// テキスト生成レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// 生成されたテキスト
    pub content: String,
    /// 使用されたモデル
    pub model: String,
    /// 使用トークン数
    #[serde(default)]
    pub usage: TokenUsage,
    /// 完了理由
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    /// テキストのみのレスポンスを作成
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: TokenUsage::default(),
            finish_reason: None,
        }
    }
}

/// トークン使用量
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// プロンプトトークン数
    pub prompt_tokens: usize,
    /// 完了トークン数
    pub completion_tokens: usize,
    /// 合計トークン数
    pub total_tokens: usize,
}

impl TokenUsage {
    /// 新しいトークン使用量を作成
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}
