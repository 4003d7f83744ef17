//! 脚本宿主
//!
//! - `interpreter` - QuickJS 运行时的独占所有权
//! - `modules` - 模块搜索路径与 `require`
//! - `controller` - AI 脚本的生命周期：启动、逐回合调用、降级与停止

pub mod controller;
pub mod interpreter;
pub mod modules;

pub use controller::{AiController, LifecycleState, StartupReport, TurnOutcome};
pub use interpreter::Interpreter;
pub use modules::{ModuleLoader, ModuleSearchPath};
