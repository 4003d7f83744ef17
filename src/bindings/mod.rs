//! 脚本绑定层
//!
//! 绑定清单是纯数据，与具体解释器无关；QuickJS 适配器在启动时消费清单，
//! 把函数、类、枚举和容器注册到脚本的接口对象上。
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                AI 脚本 (JS)                  │
//! └──────────────────────┬───────────────────────┘
//!                        v
//! ┌──────────────────────────────────────────────┐
//! │   js 适配器: ScriptValue <-> JS 值, 异常     │
//! └──────────────────────┬───────────────────────┘
//!                        v
//! ┌──────────────────────────────────────────────┐
//! │   BindingManifest: 函数 / 类 / 枚举 / 容器   │
//! └──────────────────────┬───────────────────────┘
//!                        v
//! ┌──────────────────────────────────────────────┐
//! │        AiInterface (引擎的AI命令接口)        │
//! └──────────────────────────────────────────────┘
//! ```

pub mod classes;
pub mod context;
pub mod functions;
pub mod js;
pub mod manifest;
pub mod value;

pub use context::{BindingContext, TurnSignal};
pub use manifest::{
    BindingManifest, ClassBinding, ContainerBinding, ContainerKind, ElementType, EnumBinding,
    FunctionBinding, Member, MemberKind, ReturnPolicy,
};
pub use value::{set_to_vector, Args, ObjectRef, ScriptValue};
