//! OpenAI互換プロバイダー実装（Groq / OpenAI / カスタム）

use crate::llm::{
    config::{LlmConfig, LlmProvider},
    error::{LlmError, LlmResult},
    providers::TextGenerator,
    types::{LlmRequest, LlmResponse, Message, TokenUsage},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// `/chat/completions` リクエストボディ
#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI互換プロバイダー
pub struct OpenAICompatibleProvider {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAICompatibleProvider {
    /// 新しいプロバイダーを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url().trim_end_matches('/'))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::NetworkError(err.to_string())
        }
    }
}

/// エラー応答本文から上流メッセージを抽出
fn upstream_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| fallback.to_string())
}

#[async_trait]
impl TextGenerator for OpenAICompatibleProvider {
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let body = ChatCompletionBody {
            model,
            messages: &request.messages,
            temperature: request
                .temperature
                .unwrap_or(self.config.default_temperature),
            max_tokens: request.max_tokens.or(Some(self.config.default_max_tokens)),
        };

        let mut builder = self.http.post(self.completions_url()).json(&body);
        if let Some(key) = self.config.get_api_key() {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let fallback = status.canonical_reason().unwrap_or("unknown error");
            let err = LlmError::from_status(status.as_u16(), upstream_message(&text, fallback));
            tracing::warn!(provider = %self.name(), status = status.as_u16(), error = %err, "Completion request failed");
            return Err(err);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("No choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| LlmError::Malformed("Missing message content".to_string()))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: if parsed.model.is_empty() {
                model.to_string()
            } else {
                parsed.model
            },
            usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn name(&self) -> String {
        match self.config.provider {
            LlmProvider::Groq => "Groq".to_string(),
            LlmProvider::OpenAI => "OpenAI".to_string(),
            LlmProvider::Custom => "Custom".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let provider = OpenAICompatibleProvider::new(LlmConfig::groq("key", "llama")).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(provider.name(), "Groq");

        let custom =
            OpenAICompatibleProvider::new(LlmConfig::custom("http://localhost:8080/v1/", "m"))
                .unwrap();
        assert_eq!(
            custom.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_upstream_message() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        assert_eq!(upstream_message(body, "Unauthorized"), "Invalid API Key");
        assert_eq!(upstream_message("<html>", "Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "llama-3.3-70b-versatile",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "NOTICE"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("NOTICE"));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 5);
    }

    #[test]
    fn test_request_body_serialization() {
        let messages = vec![Message::user("hi")];
        let body = ChatCompletionBody {
            model: "llama",
            messages: &messages,
            temperature: 0.3,
            max_tokens: Some(1500),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1500);
    }
}
