//! # Orion AI Host
//!
//! 为策略游戏的AI玩家提供嵌入式脚本宿主。
//!
//! ## 功能
//!
//! - **绑定清单**: 以数据声明脚本可见的函数、类、枚举和容器
//! - **QuickJS 适配器**: 把清单注册到解释器，引擎对象以回合内有效的句柄暴露给脚本
//! - **生命周期控制**: 启动解释器、加载AI模块、逐回合调用，失败时降级并代为结束回合
//!
//! ## 示例
//!
//! ```ignore
//! use orion_ai_host::config::AiConfig;
//! use orion_ai_host::scripting::AiController;
//!
//! let mut controller = AiController::new(AiConfig::load_or_default(), interface);
//! controller.generate_orders();
//! controller.shutdown();
//! ```
//!
//! ## 模块
//!
//! - [`core`]: 错误、宏与日志
//! - [`config`]: 配置系统
//! - [`universe`]: 暴露给脚本的游戏数据
//! - [`interface`]: 引擎的AI命令接口
//! - [`bindings`]: 绑定清单与 QuickJS 适配器
//! - [`scripting`]: 解释器、模块加载与控制器

/// Core infrastructure: errors, macros and logging
#[macro_use]
pub mod core;
/// Configuration system
pub mod config;
/// Game data exposed to AI scripts
pub mod universe;
/// The engine's AI command interface
pub mod interface;
/// Binding manifest and interpreter adapter
pub mod bindings;
/// Interpreter lifecycle and script modules
pub mod scripting;

#[cfg(test)]
pub(crate) mod testing;
