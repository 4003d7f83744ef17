//! 日志初始化
//!
//! 配置 tracing 日志框架。`RUST_LOG` 环境变量优先于配置中的日志级别。

use crate::config::{LogLevel, LoggingConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 安装全局日志订阅者
///
/// 重复调用是安全的：已有订阅者时保持不变。
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    if config.log_to_file {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file_path)
        {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                tracing::info!(target: "ai", "Logging to {}", config.log_file_path);
                return;
            }
            Err(e) => {
                eprintln!(
                    "Failed to open log file {}: {}, falling back to stderr",
                    config.log_file_path, e
                );
            }
        }
    }

    if config.log_to_console {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
