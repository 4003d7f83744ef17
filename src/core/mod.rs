//! 核心模块
//!
//! 包含宿主的基础设施：
//! - `error` - 错误类型定义
//! - `macros` - 通用宏（默认值、脚本枚举）
//! - `logging` - tracing 日志初始化

pub mod error;
pub mod logging;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{AiError, AiResult, BindingError, BindingResult};
pub use logging::init_logging;
