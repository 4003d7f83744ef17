//! 统一错误处理模块
//!
//! ## 错误类型分层
//!
//! - **宿主层错误** (`AiError`): 解释器启动、模块搜索路径、模块加载、入口函数调用、配置和快照读取。
//! - **绑定层错误** (`BindingError`): 脚本调用原生函数时的参数个数、参数类型和重载匹配错误。
//!   这类错误在脚本内部以异常形式抛出，不会传播到引擎。
//!
//! 控制器的回合接口从不向引擎返回错误，所有失败只记录日志。

use crate::bindings::ReturnPolicy;
use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// 宿主错误类型
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Interpreter error: {0}")]
    Interpreter(String),

    #[error("An interpreter is already running in this process")]
    AlreadyRunning,

    #[error("No module named '{name}' (searched: {searched:?})")]
    ModuleNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to load module '{name}': {reason}")]
    ModuleLoad { name: String, reason: String },

    #[error("Error calling {name}(): {reason}")]
    EntryPoint { name: String, reason: String },

    #[error("Invalid search path entry: {0}")]
    InvalidSearchPath(PathBuf),

    #[error("Invalid binding manifest: {0}")]
    Manifest(String),

    #[error("AI startup incomplete: {0}")]
    Degraded(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 绑定调用错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("{name}() takes {expected} argument(s) ({given} given)")]
    ArgumentCount {
        name: String,
        expected: usize,
        given: usize,
    },

    #[error("{name}(): argument {index} must be {expected}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: &'static str,
    },

    #[error("No overload of {name}() accepts {given} argument(s)")]
    NoOverload { name: String, given: usize },

    #[error("{0} no longer exists")]
    StaleHandle(String),

    #[error("{name}() returned {returned}, which its {policy:?} return policy does not allow")]
    ReturnPolicy {
        name: String,
        policy: ReturnPolicy,
        returned: &'static str,
    },
}

pub type AiResult<T> = Result<T, AiError>;
pub type BindingResult<T> = Result<T, BindingError>;
