/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖和默认AI脚本目录定位
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::impl_default;

pub mod runtime;

pub use runtime::RuntimeLimits;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// AI宿主主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// AI脚本目录，追加到模块搜索路径
    #[serde(default = "default_ai_dir")]
    pub ai_dir: PathBuf,

    /// 额外的模块搜索目录，排在 `ai_dir` 之后
    #[serde(default)]
    pub extra_search_paths: Vec<PathBuf>,

    /// AI脚本模块名
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// 绑定模块名
    #[serde(default = "default_interface_module")]
    pub interface_module: String,

    /// 初始化入口函数
    #[serde(default = "default_init_entry")]
    pub init_entry: String,

    /// 回合入口函数
    #[serde(default = "default_turn_entry")]
    pub turn_entry: String,

    /// 启动步骤失败时是否报错（默认仅记录日志并降级运行）
    #[serde(default)]
    pub strict_startup: bool,

    /// 解释器资源限制
    #[serde(default)]
    pub runtime: RuntimeLimits,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_ai_dir() -> PathBuf {
    global_dir().join("default").join("AI")
}

fn default_module_name() -> String {
    "FreeOrionAI".to_string()
}

fn default_interface_module() -> String {
    "FreeOrionAIInterface".to_string()
}

fn default_init_entry() -> String {
    "InitFreeOrionAI".to_string()
}

fn default_turn_entry() -> String {
    "GenerateOrders".to_string()
}

/// 全局数据目录
///
/// 优先 `ORION_GLOBAL_DIR`，其次系统数据目录下的 `orion`，最后是当前目录。
pub fn global_dir() -> PathBuf {
    if let Some(dir) = env::var_os("ORION_GLOBAL_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("orion"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl_default!(AiConfig {
    ai_dir: default_ai_dir(),
    extra_search_paths: Vec::new(),
    module_name: default_module_name(),
    interface_module: default_interface_module(),
    init_entry: default_init_entry(),
    turn_entry: default_turn_entry(),
    strict_startup: false,
    runtime: RuntimeLimits::default(),
    logging: LoggingConfig::default(),
});

impl AiConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定AI目录创建配置
    pub fn with_ai_dir(ai_dir: impl Into<PathBuf>) -> Self {
        Self {
            ai_dir: ai_dir.into(),
            ..Self::default()
        }
    }

    /// 按顺序列出模块搜索目录
    pub fn search_paths(&self) -> Vec<PathBuf> {
        std::iter::once(self.ai_dir.clone())
            .chain(self.extra_search_paths.iter().cloned())
            .collect()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 按扩展名加载配置文件（`.json` 为JSON，其余按TOML解析）
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = env::var_os("ORION_AI_DIR") {
            self.ai_dir = PathBuf::from(dir);
        }
        if let Ok(val) = env::var("ORION_AI_MODULE") {
            if !val.is_empty() {
                self.module_name = val;
            }
        }
        if let Ok(val) = env::var("ORION_AI_STRICT") {
            self.strict_startup = val.parse().unwrap_or(self.strict_startup);
        }
        if let Ok(val) = env::var("ORION_AI_MEMORY_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.runtime.memory_limit_bytes = limit;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("module_name", &self.module_name),
            ("interface_module", &self.interface_module),
            ("init_entry", &self.init_entry),
            ("turn_entry", &self.turn_entry),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a script identifier, got '{}'",
                    field, value
                )));
            }
        }
        if self.init_entry == self.turn_entry {
            return Err(ConfigError::ValidationError(
                "init_entry and turn_entry must differ".to_string(),
            ));
        }
        if self.module_name == self.interface_module {
            return Err(ConfigError::ValidationError(
                "module_name and interface_module must differ".to_string(),
            ));
        }
        self.runtime.validate()?;
        Ok(())
    }

    /// 默认的配置文件查找顺序
    ///
    /// 1. ./orion_ai.toml
    /// 2. ./orion_ai.json
    /// 3. <配置目录>/orion/ai.toml
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("orion_ai.toml"), PathBuf::from("orion_ai.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("orion").join("ai.toml"));
        }
        paths
    }

    /// 加载第一个可读取的候选文件，不输出日志
    ///
    /// 同时返回来源路径；没有可用文件时为默认配置和 `None`。
    pub fn load_first(candidates: &[PathBuf]) -> (Self, Option<PathBuf>) {
        candidates
            .iter()
            .find_map(|path| Self::from_file(path).ok().map(|config| (config, Some(path.clone()))))
            .unwrap_or_else(|| (Self::default(), None))
    }

    /// 自动查找并加载配置文件，按 [`AiConfig::candidate_paths`] 的顺序
    pub fn load_or_default() -> Self {
        let (config, source) = Self::load_first(&Self::candidate_paths());
        log_source(source.as_deref());
        config
    }
}

/// 记录配置来源，需在日志初始化之后调用
pub fn log_source(source: Option<&Path>) {
    match source {
        Some(path) => tracing::info!(target: "ai", "Loaded config from {}", path.display()),
        None => tracing::info!(target: "ai", "Using default configuration"),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到文件
    pub log_to_file: bool,

    /// 日志文件路径
    pub log_file_path: String,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_file: false,
    log_file_path: "orion_ai.log".to_string(),
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}
