//! テキスト生成コラボレーターの設定

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Groq の OpenAI 互換エンドポイント
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// OpenAI のエンドポイント
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// プロバイダー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Groq (Llama 3.3 など)
    Groq,
    /// OpenAI
    OpenAI,
    /// OpenAI互換のカスタムエンドポイント
    Custom,
}

impl LlmProvider {
    /// 認証情報を読み込む環境変数名
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "GROQ_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Custom => "DPDP_LLM_API_KEY",
        }
    }
}

/// テキスト生成設定
///
/// APIキーは設定ファイルには書かず、環境変数から読み込みます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// プロバイダー
    pub provider: LlmProvider,
    /// APIキー（セキュア）
    #[serde(skip)]
    pub api_key: Option<SecretString>,
    /// APIエンドポイント（省略時はプロバイダーのデフォルト）
    #[serde(default)]
    pub endpoint: Option<String>,
    /// デフォルトモデル
    #[serde(default = "default_model")]
    pub default_model: String,
    /// リクエストタイムアウト（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// デフォルト温度
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    /// デフォルト最大トークン数
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: usize,
}

fn default_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    1000
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

impl LlmConfig {
    /// Groq設定を作成
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Groq,
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            default_model: model.into(),
            ..Self::default()
        }
    }

    /// OpenAI設定を作成
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            default_model: model.into(),
            ..Self::default()
        }
    }

    /// カスタムエンドポイント設定を作成
    pub fn custom(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Custom,
            endpoint: Some(endpoint.into()),
            default_model: model.into(),
            ..Self::default()
        }
    }

    /// 環境変数からGroq設定を読み込み
    pub fn groq_from_env() -> LlmResult<Self> {
        let mut config = Self::default();
        if !config.load_api_key_from_env() {
            return Err(LlmError::ConfigError("GROQ_API_KEY not set".to_string()));
        }
        Ok(config)
    }

    /// プロバイダーに対応する環境変数からAPIキーを読み込み
    ///
    /// 読み込めた場合に `true` を返します。
    pub fn load_api_key_from_env(&mut self) -> bool {
        match std::env::var(self.provider.api_key_env()) {
            Ok(key) if !key.trim().is_empty() => {
                self.api_key = Some(SecretString::new(key.into_boxed_str()));
                true
            }
            _ => false,
        }
    }

    /// APIキーを設定
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into().into_boxed_str()));
        self
    }

    /// タイムアウトを取得
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// APIキーを取得（露出）
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// 利用可能なAPIキーがあるか
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some_and(|k| !k.trim().is_empty())
    }

    /// ベースURLを取得
    pub fn base_url(&self) -> &str {
        match (&self.endpoint, &self.provider) {
            (Some(endpoint), _) => endpoint.as_str(),
            (None, LlmProvider::Groq) => GROQ_API_BASE,
            (None, LlmProvider::OpenAI) => OPENAI_API_BASE,
            (None, LlmProvider::Custom) => "",
        }
    }

    /// 設定を検証
    pub fn validate(&self) -> LlmResult<()> {
        if self.provider == LlmProvider::Custom && self.endpoint.is_none() {
            return Err(LlmError::ConfigError(
                "Endpoint is required for custom providers".to_string(),
            ));
        }

        Url::parse(self.base_url()).map_err(|e| {
            LlmError::ConfigError(format!("Invalid endpoint '{}': {}", self.base_url(), e))
        })?;

        if self.default_model.trim().is_empty() {
            return Err(LlmError::ConfigError("Model must not be empty".to_string()));
        }

        // 温度の範囲チェック
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(LlmError::ConfigError(
                "Temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        // max_tokensの妥当性チェック
        if self.default_max_tokens == 0 || self.default_max_tokens > 100_000 {
            return Err(LlmError::ConfigError(
                "max_tokens must be between 1 and 100000".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(LlmError::ConfigError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            api_key: None,
            endpoint: None,
            default_model: default_model(),
            timeout_secs: default_timeout(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_config() {
        let config = LlmConfig::groq("test-key", "llama-3.3-70b-versatile");
        assert_eq!(config.provider, LlmProvider::Groq);
        assert_eq!(config.base_url(), GROQ_API_BASE);
        assert!(config.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_temperature() {
        let mut config = LlmConfig::groq("test-key", "llama");
        config.default_temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_max_tokens() {
        let mut config = LlmConfig::openai("test-key", "gpt-4");
        config.default_max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_requires_endpoint() {
        let mut config = LlmConfig::custom("http://localhost:8080/v1", "llama-3");
        assert!(config.validate().is_ok());
        assert!(!config.has_api_key());

        config.endpoint = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = LlmConfig::custom("not a url", "llama-3");
        assert!(matches!(config.validate(), Err(LlmError::ConfigError(_))));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = LlmConfig::groq("super-secret", "llama");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
