//! 跨越脚本边界的值
//!
//! 原生函数只接收和返回 [`ScriptValue`]，与具体解释器无关。引擎对象以
//! [`ObjectRef`] 句柄表示，由适配器在取用时解析。

use crate::core::{BindingError, BindingResult};
use crate::universe::ScriptEnum;
use std::collections::BTreeSet;
use std::fmt;

/// 回合内有效的引擎对象句柄
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectRef {
    Empire(i32),
    Universe,
    /// 宇宙对象，具体种类在解析时决定
    Object(i32),
    BuildingType(String),
    Tech(String),
    Special(String),
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Empire(id) => write!(f, "Empire {}", id),
            ObjectRef::Universe => write!(f, "Universe"),
            ObjectRef::Object(id) => write!(f, "UniverseObject {}", id),
            ObjectRef::BuildingType(name) => write!(f, "BuildingType '{}'", name),
            ObjectRef::Tech(name) => write!(f, "Tech '{}'", name),
            ObjectRef::Special(name) => write!(f, "Special '{}'", name),
        }
    }
}

/// 脚本值
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ScriptValue>),
    IntSet(BTreeSet<i64>),
    StringSet(BTreeSet<String>),
    Ref(ObjectRef),
}

impl ScriptValue {
    pub fn from_enum<E: ScriptEnum>(value: E) -> Self {
        ScriptValue::Int(i64::from(value.to_script()))
    }

    /// 句柄为空时返回 `Null`
    pub fn optional_ref(handle: Option<ObjectRef>) -> Self {
        handle.map(ScriptValue::Ref).unwrap_or(ScriptValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScriptValue::Null)
    }

    /// 整数值；整值浮点数也视为整数
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(v) => Some(*v),
            ScriptValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScriptValue::Int(v) => Some(*v as f64),
            ScriptValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Null => "null",
            ScriptValue::Bool(_) => "bool",
            ScriptValue::Int(_) => "int",
            ScriptValue::Float(_) => "float",
            ScriptValue::Str(_) => "string",
            ScriptValue::List(_) => "list",
            ScriptValue::IntSet(_) => "IntSet",
            ScriptValue::StringSet(_) => "StringSet",
            ScriptValue::Ref(_) => "object",
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
            items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
        }
        match self {
            ScriptValue::Null => write!(f, "null"),
            ScriptValue::Bool(v) => write!(f, "{}", v),
            ScriptValue::Int(v) => write!(f, "{}", v),
            ScriptValue::Float(v) => write!(f, "{}", v),
            ScriptValue::Str(v) => write!(f, "{}", v),
            ScriptValue::List(items) => write!(f, "[{}]", join(items.iter())),
            ScriptValue::IntSet(items) => write!(f, "IntSet{{{}}}", join(items.iter())),
            ScriptValue::StringSet(items) => write!(f, "StringSet{{{}}}", join(items.iter())),
            ScriptValue::Ref(handle) => write!(f, "<{}>", handle),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        ScriptValue::Bool(value)
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        ScriptValue::Int(i64::from(value))
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        ScriptValue::Int(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        ScriptValue::Float(value)
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        ScriptValue::Str(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::Str(value.to_string())
    }
}

impl From<Vec<i32>> for ScriptValue {
    fn from(values: Vec<i32>) -> Self {
        ScriptValue::List(values.into_iter().map(ScriptValue::from).collect())
    }
}

impl From<&BTreeSet<i32>> for ScriptValue {
    fn from(values: &BTreeSet<i32>) -> Self {
        ScriptValue::IntSet(values.iter().map(|v| i64::from(*v)).collect())
    }
}

impl From<&BTreeSet<String>> for ScriptValue {
    fn from(values: &BTreeSet<String>) -> Self {
        ScriptValue::StringSet(values.clone())
    }
}

impl From<ObjectRef> for ScriptValue {
    fn from(handle: ObjectRef) -> Self {
        ScriptValue::Ref(handle)
    }
}

/// 集合转序列，顺序即集合的有序迭代顺序
pub fn set_to_vector<T: Clone + Ord>(set: &BTreeSet<T>) -> Vec<T> {
    set.iter().cloned().collect()
}

/// 一次原生调用的实参
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    name: &'a str,
    values: &'a [ScriptValue],
}

impl<'a> Args<'a> {
    pub fn new(name: &'a str, values: &'a [ScriptValue]) -> Self {
        Self { name, values }
    }

    /// 被调用的脚本名，用于错误信息
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a ScriptValue> {
        self.values.get(index)
    }

    fn type_error(&self, index: usize, expected: &'static str) -> BindingError {
        BindingError::ArgumentType {
            name: self.name.to_string(),
            index,
            expected,
        }
    }

    pub fn int(&self, index: usize) -> BindingResult<i32> {
        self.get(index)
            .and_then(ScriptValue::as_int)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.type_error(index, "int"))
    }

    pub fn float(&self, index: usize) -> BindingResult<f64> {
        self.get(index)
            .and_then(ScriptValue::as_float)
            .ok_or_else(|| self.type_error(index, "float"))
    }

    pub fn string(&self, index: usize) -> BindingResult<&'a str> {
        self.get(index)
            .and_then(ScriptValue::as_str)
            .ok_or_else(|| self.type_error(index, "string"))
    }

    /// 枚举实参，只接受该枚举声明过的整数值
    pub fn enum_value<E: ScriptEnum>(&self, index: usize) -> BindingResult<E> {
        self.int(index)
            .ok()
            .and_then(E::from_script)
            .ok_or_else(|| self.type_error(index, E::NAME))
    }

    pub fn int_set(&self, index: usize) -> BindingResult<&'a BTreeSet<i64>> {
        match self.get(index) {
            Some(ScriptValue::IntSet(set)) => Ok(set),
            _ => Err(self.type_error(index, "IntSet")),
        }
    }

    pub fn string_set(&self, index: usize) -> BindingResult<&'a BTreeSet<String>> {
        match self.get(index) {
            Some(ScriptValue::StringSet(set)) => Ok(set),
            _ => Err(self.type_error(index, "StringSet")),
        }
    }
}
