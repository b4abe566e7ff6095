//! テキスト生成コラボレーターのエラー型定義

use crate::error::ErrorClass;
use thiserror::Error;

/// テキスト生成のエラー型
#[derive(Error, Debug)]
pub enum LlmError {
    /// 認証エラー（HTTP 401/403）
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// レート制限エラー（HTTP 429）
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 上流サーバーエラー
    #[error("Server error: {0}")]
    ServerError(String),

    /// 応答の形式不正
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// ネットワークエラー
    #[error("Network error: {0}")]
    NetworkError(String),

    /// タイムアウト
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// JSONパースエラー
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LlmError {
    /// HTTPステータスからエラーを分類
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => LlmError::Unauthorized(message),
            429 => LlmError::RateLimited(message),
            _ => LlmError::ServerError(format!("HTTP {}: {}", status, message)),
        }
    }

    /// ワークフロー境界でのエラー分類
    pub fn class(&self) -> ErrorClass {
        match self {
            LlmError::Unauthorized(_) | LlmError::ConfigError(_) => ErrorClass::Credential,
            LlmError::RateLimited(_)
            | LlmError::ServerError(_)
            | LlmError::NetworkError(_)
            | LlmError::Timeout(_) => ErrorClass::Transient,
            LlmError::Malformed(_) | LlmError::JsonError(_) => ErrorClass::Validation,
        }
    }

    /// 認証情報を無効化すべきエラーか
    pub fn invalidates_credential(&self) -> bool {
        matches!(self, LlmError::Unauthorized(_))
    }
}

/// テキスト生成の結果型
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            LlmError::from_status(401, "bad key"),
            LlmError::Unauthorized(_)
        ));
        assert!(matches!(
            LlmError::from_status(403, "forbidden"),
            LlmError::Unauthorized(_)
        ));
        assert!(matches!(
            LlmError::from_status(429, "slow down"),
            LlmError::RateLimited(_)
        ));
        match LlmError::from_status(503, "unavailable") {
            LlmError::ServerError(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_class() {
        assert_eq!(
            LlmError::Unauthorized("x".into()).class(),
            ErrorClass::Credential
        );
        assert_eq!(LlmError::Timeout(60).class(), ErrorClass::Transient);
        assert_eq!(
            LlmError::RateLimited("x".into()).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            LlmError::Malformed("x".into()).class(),
            ErrorClass::Validation
        );
        assert!(LlmError::Unauthorized("x".into()).invalidates_credential());
        assert!(!LlmError::ConfigError("x".into()).invalidates_credential());
    }
}
