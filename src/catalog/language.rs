//! Scheduled Languages
//!
//! 憲法第8附則の言語＋英語

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// デフォルト言語コード
pub const DEFAULT_LANGUAGE: &str = "en";

/// 通知言語
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 コード
    pub code: String,
    /// 英語名
    pub label: String,
    /// 自言語での表記
    pub native: String,
}

impl Language {
    pub fn new(code: impl Into<String>, label: impl Into<String>, native: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            native: native.into(),
        }
    }
}

/// 言語レジストリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
    default_code: String,
}

impl LanguageRegistry {
    /// 言語リストとデフォルト言語からレジストリを作成
    pub fn new(languages: Vec<Language>, default_code: impl Into<String>) -> Result<Self> {
        let default_code = default_code.into();
        if !languages.iter().any(|l| l.code == default_code) {
            return Err(Error::Config(format!(
                "Default language '{}' is not in the language catalog",
                default_code
            )));
        }
        Ok(Self {
            languages,
            default_code,
        })
    }

    /// 標準言語リスト
    pub fn dpdp_default() -> Self {
        let languages = vec![
            Language::new("en", "English", "English"),
            Language::new("hi", "Hindi", "हिन्दी"),
            Language::new("bn", "Bengali", "বাংলা"),
            Language::new("te", "Telugu", "తెలుగు"),
            Language::new("mr", "Marathi", "मराठी"),
            Language::new("ta", "Tamil", "தமிழ்"),
            Language::new("gu", "Gujarati", "ગુજરાતી"),
            Language::new("kn", "Kannada", "ಕನ್ನಡ"),
            Language::new("ml", "Malayalam", "മലയാളം"),
            Language::new("pa", "Punjabi", "ਪੰਜਾਬੀ"),
            Language::new("or", "Odia", "ଓଡ଼ିଆ"),
            Language::new("as", "Assamese", "অসমীয়া"),
        ];

        Self {
            languages,
            default_code: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default_code == code
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_languages() {
        let registry = LanguageRegistry::dpdp_default();
        assert_eq!(registry.len(), 12);
        assert!(registry.is_default("en"));
        assert_eq!(registry.get("hi").unwrap().label, "Hindi");
    }

    #[test]
    fn test_default_must_be_listed() {
        let result = LanguageRegistry::new(vec![Language::new("hi", "Hindi", "हिन्दी")], "en");
        assert!(result.is_err());
    }
}
