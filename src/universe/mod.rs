//! 引擎对象视图
//!
//! AI 可见的只读数据：帝国、宇宙对象、规则表和枚举。这些类型只描述引擎交给
//! AI 的状态，不包含任何模拟逻辑；每个值只在获取它的回合内有效。

pub mod empire;
pub mod enums;
pub mod object;
pub mod rules;
#[allow(clippy::module_inception)]
pub mod universe;

pub use empire::Empire;
pub use enums::{
    CaptureResult, FocusType, MeterType, PlanetEnvironment, PlanetSize, PlanetType, ScriptEnum,
    StarType, TechStatus, TechType,
};
pub use object::{
    Building, Fleet, ObjectKind, Planet, Ship, System, UniverseObject, INVALID_GAME_TURN,
    INVALID_OBJECT_AGE, INVALID_OBJECT_ID,
};
pub use rules::{BuildingType, RuleTables, Special, Tech};
pub use universe::Universe;
