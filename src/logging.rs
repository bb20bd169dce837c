//! # Logging モジュール
//!
//! 車両シミュレーションの診断ログ出力を初期化します。
//!
//! 実行中の進行表示（Observer経由のコンソール出力）とは別に、エンジン内部の
//! `tracing` イベントをコンソール（stderr）やJSONファイルへ出力します。
//! ファイル出力は tracing-appender の非同期ライターを使うため、ステップ処理の
//! 速度に影響しません。
//!
//! ## 設定可能な出力先
//!
//! - `Console`: コンソール（stderr）のみ
//! - `File`: ファイルのみ（logs/vehsim.YYYY-MM-DD）
//! - `Both`: コンソールとファイルの両方

use std::str::FromStr;
use tracing::Level;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// ログ出力先の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogOutput {
    /// コンソールのみ
    Console,
    /// ファイルのみ
    File,
    /// コンソールとファイルの両方
    Both,
}

impl LogOutput {
    fn to_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stderr" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(format!("無効な出力先: {}. 利用可能: console, file, both", s)),
        }
    }
}

/// ログ設定構造体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル（環境変数 RUST_LOG が優先）
    pub level: Level,
    /// 出力先
    pub output: LogOutput,
    /// ログファイルのディレクトリ
    pub log_dir: String,
    /// ログファイル名のプレフィックス
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            output: LogOutput::Console,
            log_dir: "logs".to_string(),
            file_prefix: "vehsim".to_string(),
        }
    }
}

/// ログシステムを初期化
///
/// ファイル出力を含む場合は非同期ライターのガードを返す。ガードが破棄されると
/// 未書き込みのログが失われるため、呼び出し側はプロセス終了まで保持すること。
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_string()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = config.output.to_console().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });

    let mut guard = None;
    let file_layer = if config.output.to_file() {
        ensure_log_directory(&config.log_dir)?;
        let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
        let (writer, worker_guard) = non_blocking(file_appender);
        guard = Some(worker_guard);
        Some(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(false)
                .json(),
        )
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// ログレベルを文字列から解析
///
/// 無効な文字列の場合は警告を表示してWARNを返す。
pub fn parse_log_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("警告: 無効なログレベル '{}'. WARNを使用します", level_str);
            Level::WARN
        }
    }
}

/// `-v` の指定回数からログレベルを決定
pub fn level_from_verbosity(verbose: u8, base: Level) -> Level {
    match verbose {
        0 => base,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// ログディレクトリを作成
pub fn ensure_log_directory(log_dir: &str) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(log_dir)
}
