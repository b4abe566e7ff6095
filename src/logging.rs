use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログファイル名の接頭辞
const LOG_FILE_PREFIX: &str = "dpdp-consent.log";

/// ログ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// ログレベル、または EnvFilter 形式のディレクティブ
    pub level: String,
    /// ログディレクトリ
    pub log_dir: PathBuf,
    /// ファイルローテーション設定
    pub rotation: LogRotation,
    /// コンソール出力有効
    pub console_enabled: bool,
    /// ファイル出力有効
    pub file_enabled: bool,
    /// ファイル出力をJSON形式にする
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// 日次ローテーション
    Daily,
    /// 時間毎ローテーション
    Hourly,
    /// ローテーションなし
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            rotation: LogRotation::Daily,
            console_enabled: true,
            file_enabled: false,
            json: false,
        }
    }
}

impl LogConfig {
    /// カスタムログディレクトリを設定
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// ローテーション設定
    pub fn with_rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// コンソール出力制御
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console_enabled = enabled;
        self
    }

    /// ファイル出力制御
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.file_enabled = enabled;
        self
    }

    /// EnvFilter を作成（`RUST_LOG` が設定されていれば優先）
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// ログディレクトリを確保
fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    Ok(())
}

fn file_appender(config: &LogConfig) -> rolling::RollingFileAppender {
    match config.rotation {
        LogRotation::Daily => rolling::daily(&config.log_dir, LOG_FILE_PREFIX),
        LogRotation::Hourly => rolling::hourly(&config.log_dir, LOG_FILE_PREFIX),
        LogRotation::Never => rolling::never(&config.log_dir, LOG_FILE_PREFIX),
    }
}

/// ログシステムを初期化
///
/// ファイル出力が有効な場合は `WorkerGuard` を返します。呼び出し側は
/// プロセス終了まで保持してください（破棄するとバッファが書き出されません）。
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true)
            .boxed()
    });

    let (file_layer, guard) = if config.file_enabled {
        ensure_log_dir(&config.log_dir)?;
        let (writer, guard) = non_blocking(file_appender(config));
        let layer = if config.json {
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        };
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("global tracing subscriber already installed")?;

    tracing::info!(
        level = %config.level,
        console = config.console_enabled,
        file = config.file_enabled,
        log_dir = %config.log_dir.display(),
        "Logging initialized"
    );

    Ok(guard)
}
