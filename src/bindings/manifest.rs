//! 绑定清单
//!
//! 声明哪些原生函数、类型成员、枚举和容器对脚本可见，以什么名字暴露，采用
//! 什么返回策略。清单本身只是数据，不依赖任何解释器类型，由适配器在启动时
//! 一次性注册。

use super::classes::{self, Resolve};
use super::context::BindingContext;
use super::functions;
use super::value::{Args, ObjectRef, ScriptValue};
use crate::core::{AiError, AiResult, BindingError, BindingResult};
use crate::interface::AiInterface;
use crate::universe::ScriptEnum;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// 返回值的所有权策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPolicy {
    /// 返回新建的值（序列等）
    ByValue,
    /// 复制引擎持有的常量引用
    CopyConstRef,
    /// 引用引擎持有的对象，只在当前回合有效
    ExistingReference,
}

impl ReturnPolicy {
    /// 引用策略只能返回句柄或空值，其余策略不能返回句柄
    pub fn admits(self, value: &ScriptValue) -> bool {
        match self {
            ReturnPolicy::ExistingReference => {
                matches!(value, ScriptValue::Ref(_) | ScriptValue::Null)
            }
            ReturnPolicy::ByValue | ReturnPolicy::CopyConstRef => {
                !matches!(value, ScriptValue::Ref(_))
            }
        }
    }

    fn check(self, name: &str, value: ScriptValue) -> BindingResult<ScriptValue> {
        if self.admits(&value) {
            Ok(value)
        } else {
            Err(BindingError::ReturnPolicy {
                name: name.to_string(),
                policy: self,
                returned: value.type_name(),
            })
        }
    }
}

/// 自由函数的原生实现
pub type NativeFn = fn(&BindingContext, &Args<'_>) -> BindingResult<ScriptValue>;

/// 同名函数的一个重载
#[derive(Clone, Copy)]
pub struct Overload {
    pub arity: usize,
    pub call: NativeFn,
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload").field("arity", &self.arity).finish()
    }
}

/// 自由函数
#[derive(Debug, Clone)]
pub struct FunctionBinding {
    pub name: &'static str,
    pub policy: ReturnPolicy,
    pub overloads: Vec<Overload>,
}

impl FunctionBinding {
    pub fn new(name: &'static str, policy: ReturnPolicy, arity: usize, call: NativeFn) -> Self {
        Self {
            name,
            policy,
            overloads: vec![Overload { arity, call }],
        }
    }

    /// 追加一个重载
    pub fn overload(mut self, arity: usize, call: NativeFn) -> Self {
        self.overloads.push(Overload { arity, call });
        self
    }

    /// 按实参个数选择重载并调用
    pub fn dispatch(&self, ctx: &BindingContext, values: &[ScriptValue]) -> BindingResult<ScriptValue> {
        let args = Args::new(self.name, values);
        match self.overloads.iter().find(|o| o.arity == args.len()) {
            Some(overload) => (overload.call)(ctx, &args).and_then(|v| self.policy.check(self.name, v)),
            None if self.overloads.len() == 1 => Err(BindingError::ArgumentCount {
                name: self.name.to_string(),
                expected: self.overloads[0].arity,
                given: args.len(),
            }),
            None => Err(BindingError::NoOverload {
                name: self.name.to_string(),
                given: args.len(),
            }),
        }
    }
}

/// 成员的原生实现，每次调用时重新解析句柄
pub type MemberFn =
    Box<dyn Fn(&dyn AiInterface, &ObjectRef, &Args<'_>) -> BindingResult<ScriptValue>>;

/// 成员种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// 只读属性，取用对象时复制
    Property,
    /// 方法
    Method { arity: usize },
    /// 类常量
    Constant,
}

/// 类型成员
pub struct Member {
    pub name: &'static str,
    pub policy: ReturnPolicy,
    pub kind: MemberKind,
    call: MemberFn,
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("kind", &self.kind)
            .finish()
    }
}

fn stale(handle: &ObjectRef) -> BindingError {
    BindingError::StaleHandle(handle.to_string())
}

impl Member {
    pub fn property<T: Resolve + 'static>(
        name: &'static str,
        policy: ReturnPolicy,
        get: fn(&T, &dyn AiInterface) -> ScriptValue,
    ) -> Self {
        Self {
            name,
            policy,
            kind: MemberKind::Property,
            call: Box::new(move |iface: &dyn AiInterface, handle: &ObjectRef, _args: &Args<'_>| {
                let target = T::resolve(iface, handle).ok_or_else(|| stale(handle))?;
                Ok(get(target, iface))
            }),
        }
    }

    pub fn method<T: Resolve + 'static>(
        name: &'static str,
        policy: ReturnPolicy,
        arity: usize,
        call: fn(&T, &dyn AiInterface, &Args<'_>) -> BindingResult<ScriptValue>,
    ) -> Self {
        Self {
            name,
            policy,
            kind: MemberKind::Method { arity },
            call: Box::new(move |iface: &dyn AiInterface, handle: &ObjectRef, args: &Args<'_>| {
                let target = T::resolve(iface, handle).ok_or_else(|| stale(handle))?;
                call(target, iface, args)
            }),
        }
    }

    pub fn constant(name: &'static str, value: fn() -> ScriptValue) -> Self {
        Self {
            name,
            policy: ReturnPolicy::ByValue,
            kind: MemberKind::Constant,
            call: Box::new(move |_iface: &dyn AiInterface, _handle: &ObjectRef, _args: &Args<'_>| {
                Ok(value())
            }),
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    /// 在句柄上调用成员；方法会先检查实参个数
    pub fn invoke(
        &self,
        iface: &dyn AiInterface,
        handle: &ObjectRef,
        values: &[ScriptValue],
    ) -> BindingResult<ScriptValue> {
        if let MemberKind::Method { arity } = self.kind {
            if values.len() != arity {
                return Err(BindingError::ArgumentCount {
                    name: self.name.to_string(),
                    expected: arity,
                    given: values.len(),
                });
            }
        }
        (self.call)(iface, handle, &Args::new(self.name, values))
            .and_then(|value| self.policy.check(self.name, value))
    }
}

/// 暴露给脚本的类型
#[derive(Debug)]
pub struct ClassBinding {
    pub name: &'static str,
    /// 直接基类，按声明顺序
    pub bases: Vec<&'static str>,
    pub members: Vec<Member>,
}

impl ClassBinding {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn base(mut self, base: &'static str) -> Self {
        self.bases.push(base);
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn own_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// 暴露给脚本的枚举：名称与取值表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumBinding {
    pub name: &'static str,
    pub values: Vec<(&'static str, i32)>,
}

impl EnumBinding {
    pub fn of<E: ScriptEnum>() -> Self {
        Self {
            name: E::NAME,
            values: E::VALUES
                .iter()
                .map(|(name, variant)| (*name, variant.to_script()))
                .collect(),
        }
    }
}

/// 容器元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Int,
    Str,
}

/// 容器形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// 可索引、可枚举的序列
    Sequence,
    /// 有序集合，脚本侧只能查询成员，枚举需先转换为序列
    Set,
}

/// 容器适配器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerBinding {
    pub name: &'static str,
    pub element: ElementType,
    pub kind: ContainerKind,
}

impl ContainerBinding {
    pub const fn new(name: &'static str, element: ElementType, kind: ContainerKind) -> Self {
        Self { name, element, kind }
    }

    /// 由脚本提供的元素构造容器，元素类型不符时报错
    pub fn build(&self, items: &[ScriptValue]) -> BindingResult<ScriptValue> {
        let args = Args::new(self.name, items);
        match (self.element, self.kind) {
            (ElementType::Int, ContainerKind::Sequence) => (0..args.len())
                .map(|i| args.int(i).map(ScriptValue::from))
                .collect::<BindingResult<Vec<_>>>()
                .map(ScriptValue::List),
            (ElementType::Str, ContainerKind::Sequence) => (0..args.len())
                .map(|i| args.string(i).map(ScriptValue::from))
                .collect::<BindingResult<Vec<_>>>()
                .map(ScriptValue::List),
            (ElementType::Int, ContainerKind::Set) => (0..args.len())
                .map(|i| args.int(i).map(i64::from))
                .collect::<BindingResult<BTreeSet<_>>>()
                .map(ScriptValue::IntSet),
            (ElementType::Str, ContainerKind::Set) => (0..args.len())
                .map(|i| args.string(i).map(str::to_string))
                .collect::<BindingResult<BTreeSet<_>>>()
                .map(ScriptValue::StringSet),
        }
    }
}

/// 完整的绑定清单
#[derive(Debug, Default)]
pub struct BindingManifest {
    pub functions: Vec<FunctionBinding>,
    pub classes: Vec<ClassBinding>,
    pub enums: Vec<EnumBinding>,
    pub containers: Vec<ContainerBinding>,
}

impl BindingManifest {
    /// 引擎的标准AI接口
    pub fn standard() -> Self {
        Self {
            functions: functions::standard_functions(),
            classes: classes::standard_classes(),
            enums: classes::standard_enums(),
            containers: vec![
                ContainerBinding::new("IntVec", ElementType::Int, ContainerKind::Sequence),
                ContainerBinding::new("StringVec", ElementType::Str, ContainerKind::Sequence),
                ContainerBinding::new("IntSet", ElementType::Int, ContainerKind::Set),
                ContainerBinding::new("StringSet", ElementType::Str, ContainerKind::Set),
            ],
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionBinding> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassBinding> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn container(&self, name: &str) -> Option<&ContainerBinding> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// 类及其全部基类，派生类在前，每个类只出现一次
    pub fn lineage(&self, class: &str) -> Vec<&ClassBinding> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.collect_lineage(class, &mut order, &mut seen);
        order
    }

    fn collect_lineage<'a>(
        &'a self,
        class: &str,
        order: &mut Vec<&'a ClassBinding>,
        seen: &mut HashSet<&'a str>,
    ) {
        let Some(binding) = self.class(class) else {
            return;
        };
        if !seen.insert(binding.name) {
            return;
        }
        order.push(binding);
        for base in &binding.bases {
            self.collect_lineage(base, order, seen);
        }
    }

    /// 类可见的全部成员；派生类的同名成员遮蔽基类成员
    pub fn members_of(&self, class: &str) -> Vec<&Member> {
        let mut names = HashSet::new();
        let mut members = Vec::new();
        for binding in self.lineage(class) {
            for member in &binding.members {
                if names.insert(member.name) {
                    members.push(member);
                }
            }
        }
        members
    }

    /// 按名称查找类可见的成员
    pub fn member(&self, class: &str, name: &str) -> Option<&Member> {
        self.lineage(class)
            .into_iter()
            .find_map(|binding| binding.own_member(name))
    }

    /// 检查名称唯一、重载个数互不相同、基类均已声明，属性不能声明为引用
    pub fn validate(&self) -> AiResult<()> {
        let mut top_level = HashSet::new();
        let names = self
            .functions
            .iter()
            .map(|f| f.name)
            .chain(self.classes.iter().map(|c| c.name))
            .chain(self.enums.iter().map(|e| e.name))
            .chain(self.containers.iter().map(|c| c.name));
        for name in names {
            if !top_level.insert(name) {
                return Err(AiError::Manifest(format!("'{}' is declared twice", name)));
            }
        }

        for function in &self.functions {
            if function.overloads.is_empty() {
                return Err(AiError::Manifest(format!("{}() has no overloads", function.name)));
            }
            let mut arities = HashSet::new();
            if !function.overloads.iter().all(|o| arities.insert(o.arity)) {
                return Err(AiError::Manifest(format!(
                    "{}() has two overloads with the same arity",
                    function.name
                )));
            }
        }

        for class in &self.classes {
            if let Some(base) = class.bases.iter().find(|b| self.class(b).is_none()) {
                return Err(AiError::Manifest(format!(
                    "{} derives from undeclared class {}",
                    class.name, base
                )));
            }
            if let Some(member) = class
                .members
                .iter()
                .find(|m| !m.is_method() && m.policy == ReturnPolicy::ExistingReference)
            {
                return Err(AiError::Manifest(format!(
                    "{}.{} is copied on lookup and cannot return a reference",
                    class.name, member.name
                )));
            }
            let mut members = HashSet::new();
            if let Some(member) = class.members.iter().find(|m| !members.insert(m.name)) {
                return Err(AiError::Manifest(format!(
                    "{}.{} is declared twice",
                    class.name, member.name
                )));
            }
        }

        for binding in &self.enums {
            let mut values = HashSet::new();
            if !binding.values.iter().all(|(_, v)| values.insert(*v)) {
                return Err(AiError::Manifest(format!(
                    "enum {} has duplicate values",
                    binding.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::context::TurnSignal;
    use crate::testing::{sample_client, shared};
    use crate::universe::{CaptureResult, StarType, Universe};

    fn answer(_: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
        Ok(ScriptValue::Int(42))
    }

    fn universe_handle(_: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
        Ok(ObjectRef::Universe.into())
    }

    #[test]
    fn test_return_policy_is_enforced() {
        let client = sample_client();
        let ctx = BindingContext::new(shared(&client), TurnSignal::new());

        let not_a_reference = FunctionBinding::new("Answer", ReturnPolicy::ExistingReference, 0, answer);
        assert_eq!(
            not_a_reference.dispatch(&ctx, &[]),
            Err(BindingError::ReturnPolicy {
                name: "Answer".to_string(),
                policy: ReturnPolicy::ExistingReference,
                returned: "int",
            })
        );

        let leaked = FunctionBinding::new("Leak", ReturnPolicy::ByValue, 0, universe_handle);
        assert!(matches!(
            leaked.dispatch(&ctx, &[]),
            Err(BindingError::ReturnPolicy { .. })
        ));

        assert!(ReturnPolicy::ExistingReference.admits(&ScriptValue::Null));
        assert!(ReturnPolicy::CopyConstRef.admits(&ScriptValue::from("x")));
        assert!(!ReturnPolicy::CopyConstRef.admits(&ScriptValue::Ref(ObjectRef::Universe)));
    }

    #[test]
    fn test_validate_rejects_reference_property() {
        let mut manifest = BindingManifest::standard();
        manifest.classes.push(ClassBinding::new("Broken").member(Member::property(
            "universe",
            ReturnPolicy::ExistingReference,
            |_: &Universe, _| ScriptValue::Ref(ObjectRef::Universe),
        )));
        assert!(matches!(
            manifest.validate(),
            Err(AiError::Manifest(message)) if message.contains("Broken.universe")
        ));
    }

    #[test]
    fn test_standard_manifest_is_valid() {
        let manifest = BindingManifest::standard();
        manifest.validate().expect("standard manifest validates");
        for name in ["PlayerName", "GetEmpire", "DoneTurn", "IntSetToIntVector", "GetTech"] {
            assert!(manifest.function(name).is_some(), "missing {}", name);
        }
        for name in ["Empire", "Universe", "Fleet", "Planet", "PopCenter", "Tech", "Special"] {
            assert!(manifest.class(name).is_some(), "missing {}", name);
        }
        assert_eq!(manifest.enums.len(), 9);
        assert_eq!(manifest.containers.len(), 4);
    }

    #[test]
    fn test_overloads_share_one_name() {
        let manifest = BindingManifest::standard();
        let player_name = manifest.function("PlayerName").expect("PlayerName");
        let arities: Vec<usize> = player_name.overloads.iter().map(|o| o.arity).collect();
        assert_eq!(arities, vec![0, 1]);
        assert_eq!(player_name.policy, ReturnPolicy::CopyConstRef);

        let get_empire = manifest.function("GetEmpire").expect("GetEmpire");
        assert_eq!(get_empire.overloads.len(), 2);
        assert_eq!(get_empire.policy, ReturnPolicy::ExistingReference);
    }

    #[test]
    fn test_dispatch_by_arity() {
        let manifest = BindingManifest::standard();
        let client = sample_client();
        let ctx = BindingContext::new(shared(&client), TurnSignal::new());
        let player_name = manifest.function("PlayerName").expect("PlayerName");

        assert_eq!(player_name.dispatch(&ctx, &[]), Ok(ScriptValue::from("AI_1")));
        assert_eq!(
            player_name.dispatch(&ctx, &[ScriptValue::Int(2)]),
            Ok(ScriptValue::from("Human"))
        );
        assert_eq!(
            player_name.dispatch(&ctx, &[ScriptValue::Int(1), ScriptValue::Int(2)]),
            Err(BindingError::NoOverload {
                name: "PlayerName".to_string(),
                given: 2,
            })
        );

        let turn = manifest.function("CurrentTurn").expect("CurrentTurn");
        assert_eq!(
            turn.dispatch(&ctx, &[ScriptValue::Int(1)]),
            Err(BindingError::ArgumentCount {
                name: "CurrentTurn".to_string(),
                expected: 0,
                given: 1,
            })
        );
    }

    #[test]
    fn test_planet_lineage() {
        let manifest = BindingManifest::standard();
        let lineage: Vec<&str> = manifest.lineage("Planet").iter().map(|c| c.name).collect();
        assert_eq!(lineage, vec!["Planet", "UniverseObject", "PopCenter", "ResourceCenter"]);

        let members: Vec<&str> = manifest.members_of("Planet").iter().map(|m| m.name).collect();
        for name in ["type", "id", "ageInTurns", "inhabitants", "primaryFocus", "GetMeter"] {
            assert!(members.contains(&name), "Planet lacks {}", name);
        }
        assert!(manifest.lineage("Nope").is_empty());
    }

    #[test]
    fn test_member_invoke_and_stale_handle() {
        let manifest = BindingManifest::standard();
        let client = sample_client();
        let iface = client.borrow();

        let star = manifest.member("System", "starType").expect("starType");
        assert_eq!(
            star.invoke(&*iface, &ObjectRef::Object(1), &[]),
            Ok(ScriptValue::from_enum(StarType::Yellow))
        );

        let owned_by = manifest.member("Fleet", "OwnedBy").expect("OwnedBy");
        assert_eq!(
            owned_by.invoke(&*iface, &ObjectRef::Object(30), &[ScriptValue::Int(1)]),
            Ok(ScriptValue::Bool(true))
        );
        assert!(matches!(
            owned_by.invoke(&*iface, &ObjectRef::Object(30), &[]),
            Err(BindingError::ArgumentCount { .. })
        ));
        assert_eq!(
            owned_by.invoke(&*iface, &ObjectRef::Object(999), &[ScriptValue::Int(1)]),
            Err(BindingError::StaleHandle("UniverseObject 999".to_string()))
        );

        let capture = manifest.member("BuildingType", "CaptureResult").expect("CaptureResult");
        assert_eq!(
            capture.invoke(&*iface, &ObjectRef::BuildingType("BLD_SHIPYARD_BASE".into()), &[]),
            Ok(ScriptValue::from_enum(CaptureResult::Destroy))
        );
    }

    #[test]
    fn test_container_build() {
        let manifest = BindingManifest::standard();
        let int_set = manifest.container("IntSet").expect("IntSet");
        assert_eq!(
            int_set.build(&[ScriptValue::Int(3), ScriptValue::Int(1), ScriptValue::Int(3)]),
            Ok(ScriptValue::IntSet([1, 3].into_iter().collect()))
        );
        let string_vec = manifest.container("StringVec").expect("StringVec");
        assert!(string_vec.build(&[ScriptValue::Int(3)]).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut manifest = BindingManifest::standard();
        manifest.enums.push(EnumBinding::of::<StarType>());
        assert!(matches!(manifest.validate(), Err(AiError::Manifest(_))));

        let mut manifest = BindingManifest::standard();
        manifest.classes.push(ClassBinding::new("Orphan").base("Missing"));
        assert!(manifest.validate().is_err());
    }
}
