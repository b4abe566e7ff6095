//! Static Catalogs
//!
//! 処理目的・ペルソナ・言語の静的カタログ。プロセス起動時に一度だけ読み込み、
//! 以降は `Arc<Catalog>` として各セッションで共有します（実行時の変更不可）。
//!
//! ## 使用例
//!
//! ```rust
//! use dpdp_consent::catalog::Catalog;
//!
//! let catalog = Catalog::dpdp_default();
//! assert_eq!(catalog.purposes().len(), 6);
//! assert!(catalog.languages().is_default("en"));
//! ```

pub mod language;
pub mod persona;
pub mod purpose;

pub use language::{Language, LanguageRegistry, DEFAULT_LANGUAGE};
pub use persona::{Persona, PersonaRegistry, ReadingLevel};
pub use purpose::{LawfulBasis, Purpose, PurposeRegistry};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// カタログファイル形式（TOML）
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_language_code")]
    default_language: String,
    purposes: Vec<Purpose>,
    personas: Vec<Persona>,
    languages: Vec<Language>,
}

fn default_language_code() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// 3つのレジストリをまとめた不変カタログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    purposes: PurposeRegistry,
    personas: PersonaRegistry,
    languages: LanguageRegistry,
}

impl Catalog {
    pub fn new(
        purposes: PurposeRegistry,
        personas: PersonaRegistry,
        languages: LanguageRegistry,
    ) -> Self {
        Self {
            purposes,
            personas,
            languages,
        }
    }

    /// 組み込みの DPDP 標準カタログ
    pub fn dpdp_default() -> Self {
        Self::new(
            PurposeRegistry::dpdp_default(),
            PersonaRegistry::dpdp_default(),
            LanguageRegistry::dpdp_default(),
        )
    }

    /// TOML文字列からカタログを読み込み
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        if file.languages.is_empty() {
            return Err(Error::Config(
                "Language catalog must not be empty".to_string(),
            ));
        }

        Ok(Self::new(
            PurposeRegistry::new(file.purposes)?,
            PersonaRegistry::new(file.personas)?,
            LanguageRegistry::new(file.languages, file.default_language)?,
        ))
    }

    /// ファイルからカタログを読み込み
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            purposes = catalog.purposes.len(),
            personas = catalog.personas.len(),
            languages = catalog.languages.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn purposes(&self) -> &PurposeRegistry {
        &self.purposes
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::dpdp_default()
    }
}
