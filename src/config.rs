use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::llm::LlmConfig;
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 既定のデータ受託者名
pub const DEFAULT_FIDUCIARY: &str = "DataSeva Platform Pvt. Ltd.";

/// 設定ファイルの探索順
const CONFIG_PATHS: [&str; 3] = [
    "dpdp-consent.toml",
    "config.toml",
    "config/dpdp-consent.toml",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub fiduciary: FiduciaryConfig,
    pub llm: LlmConfig,
    pub logging: LogConfig,
    /// 処理目的・ペルソナ・言語カタログ（省略時は組み込みカタログ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FiduciaryConfig {
    pub name: String,
    /// 新しいフローで最初に選択される表示言語
    pub default_language: String,
}

impl Default for FiduciaryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_FIDUCIARY.to_string(),
            default_language: crate::catalog::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fiduciary: FiduciaryConfig::default(),
            llm: LlmConfig::default(),
            logging: LogConfig::default(),
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// 設定ファイルから読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let found = CONFIG_PATHS
            .iter()
            .map(|p| Path::new(*p))
            .find(|path| path.exists());
        Self::load_from(found)
    }

    /// 指定ファイル（任意）から読み込み、環境変数で上書き
    ///
    /// 優先順位: 組み込みデフォルト < 設定ファイル < `DPDP__*` 環境変数。
    /// APIキーは設定ファイルからは読まず、プロバイダーの環境変数から取得します。
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default()).map_err(config_error)?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            tracing::info!(path = %path.display(), "Loading configuration file");
            settings = settings.add_source(config::File::from(path));
        }

        // 例: DPDP__LLM__DEFAULT_MODEL=llama-3.1-8b-instant
        settings = settings.add_source(
            config::Environment::with_prefix("DPDP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = settings
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        if !config.llm.load_api_key_from_env() {
            tracing::warn!(
                env = config.llm.provider.api_key_env(),
                "No collaborator API key found in environment"
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// 設定を検証
    pub fn validate(&self) -> Result<()> {
        if self.fiduciary.name.trim().is_empty() {
            return Err(Error::Config("Fiduciary name must not be empty".to_string()));
        }
        self.llm
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        if self.catalog_path.is_none() {
            // 組み込みカタログに存在する言語のみ許可
            self.ensure_known_language(&Catalog::dpdp_default())?;
        }
        Ok(())
    }

    fn ensure_known_language(&self, catalog: &Catalog) -> Result<()> {
        if catalog
            .languages()
            .get(&self.fiduciary.default_language)
            .is_none()
        {
            return Err(Error::Config(format!(
                "Unknown default language: {}",
                self.fiduciary.default_language
            )));
        }
        Ok(())
    }

    /// カタログを構築（ファイル指定があれば読み込み）
    pub fn build_catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::dpdp_default(),
        };
        self.ensure_known_language(&catalog)?;
        Ok(catalog)
    }

    /// 環境変数にAPIキーが設定されているか
    pub fn has_api_key(&self) -> bool {
        self.llm.has_api_key()
    }

    /// サンプル設定ファイルを生成
    pub fn generate_sample_config(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let sample = AppConfig::default();

        let toml_content = toml::to_string_pretty(&sample)
            .map_err(|e| Error::Config(format!("Failed to render sample config: {}", e)))?;

        let sample_content = format!(
            r#"# dpdp-consent configuration
#
# Save as dpdp-consent.toml (or config.toml / config/dpdp-consent.toml).
# Environment variables override file values, e.g.
#   DPDP__FIDUCIARY__NAME="Example Ltd."
#   DPDP__LLM__DEFAULT_MODEL=llama-3.1-8b-instant
#
# The API key is never read from this file. Set GROQ_API_KEY
# (or OPENAI_API_KEY / DPDP_LLM_API_KEY for the openai / custom providers).

{}
# [llm]
# provider = "groq" | "openai" | "custom"
# endpoint = "http://localhost:8080/v1"   (required for custom)
#
# catalog_path = "catalog.toml"           (purposes, personas, languages)
"#,
            toml_content
        );

        std::fs::write(path, sample_content)?;
        tracing::info!(path = %path.display(), "Sample configuration written");
        Ok(())
    }
}

fn config_error(err: config::ConfigError) -> Error {
    Error::Config(err.to_string())
}
