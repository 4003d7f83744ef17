//! JavaScript Binding Adapter using rquickjs
//!
//! 把 [`BindingManifest`] 注册进 QuickJS 上下文：自由函数、枚举对象、容器构造函数
//! 和类常量挂在接口对象上，`console` 转发到 tracing。引擎对象在取用时物化为普通
//! 对象：属性当场复制，方法保留句柄，每次调用时重新解析。

use super::classes::class_name_of;
use super::context::BindingContext;
use super::manifest::{BindingManifest, MemberKind};
use super::value::{ObjectRef, ScriptValue};
use crate::core::BindingError;
use rquickjs::function::Rest;
use rquickjs::{Array, Ctx, Exception, Function, IntoJs, Object, Value};
use std::collections::BTreeSet;
use std::rc::Rc;

/// 集合对象上的类型标记
pub const CONTAINER_TAG: &str = "__container";
const CONTAINER_ITEMS: &str = "__items";
/// 物化对象上的类名
pub const CLASS_TAG: &str = "__class";

/// 适配器持有的绑定状态
#[derive(Clone)]
pub struct Bindings {
    manifest: Rc<BindingManifest>,
    context: BindingContext,
}

impl Bindings {
    pub fn new(manifest: Rc<BindingManifest>, context: BindingContext) -> Self {
        Self { manifest, context }
    }

    pub fn manifest(&self) -> &BindingManifest {
        &self.manifest
    }

    pub fn context(&self) -> &BindingContext {
        &self.context
    }
}

fn throw(ctx: &Ctx<'_>, err: BindingError) -> rquickjs::Error {
    tracing::debug!(target: "bindings", "Throwing into script: {}", err);
    Exception::throw_message(ctx, &err.to_string())
}

/// 脚本值转为 [`ScriptValue`]；函数和普通对象不能跨越边界
pub fn from_js(value: &Value<'_>) -> Option<ScriptValue> {
    if value.is_null() || value.is_undefined() {
        return Some(ScriptValue::Null);
    }
    if let Some(v) = value.as_bool() {
        return Some(ScriptValue::Bool(v));
    }
    if let Some(v) = value.as_int() {
        return Some(ScriptValue::Int(i64::from(v)));
    }
    if let Some(v) = value.as_float() {
        return Some(ScriptValue::Float(v));
    }
    if let Some(s) = value.as_string() {
        return s.to_string().ok().map(ScriptValue::Str);
    }
    if let Some(array) = value.as_array() {
        return array
            .iter::<Value>()
            .map(|item| item.ok().and_then(|item| from_js(&item)))
            .collect::<Option<Vec<_>>>()
            .map(ScriptValue::List);
    }
    value.as_object().and_then(container_from_js)
}

fn container_from_js(object: &Object<'_>) -> Option<ScriptValue> {
    let tag: Option<String> = object.get(CONTAINER_TAG).ok()?;
    let items: Array = object.get(CONTAINER_ITEMS).ok()?;
    let items = items
        .iter::<Value>()
        .map(|item| item.ok().and_then(|item| from_js(&item)))
        .collect::<Option<Vec<_>>>()?;
    match tag.as_deref()? {
        "IntSet" => items
            .iter()
            .map(ScriptValue::as_int)
            .collect::<Option<BTreeSet<_>>>()
            .map(ScriptValue::IntSet),
        "StringSet" => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<BTreeSet<_>>>()
            .map(ScriptValue::StringSet),
        _ => None,
    }
}

/// [`ScriptValue`] 转为脚本值，句柄就地物化
pub fn to_js<'js>(ctx: &Ctx<'js>, bindings: &Bindings, value: ScriptValue) -> rquickjs::Result<Value<'js>> {
    match value {
        ScriptValue::Null => Ok(Value::new_null(ctx.clone())),
        ScriptValue::Bool(v) => Ok(Value::new_bool(ctx.clone(), v)),
        ScriptValue::Int(v) => match i32::try_from(v) {
            Ok(small) => Ok(Value::new_int(ctx.clone(), small)),
            Err(_) => Ok(Value::new_float(ctx.clone(), v as f64)),
        },
        ScriptValue::Float(v) => Ok(Value::new_float(ctx.clone(), v)),
        ScriptValue::Str(v) => v.into_js(ctx),
        ScriptValue::List(items) => {
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.into_iter().enumerate() {
                array.set(index, to_js(ctx, bindings, item)?)?;
            }
            Ok(array.into_value())
        }
        ScriptValue::IntSet(items) => {
            set_object(ctx, "IntSet", items.into_iter().map(ScriptValue::Int).collect())
        }
        ScriptValue::StringSet(items) => {
            set_object(ctx, "StringSet", items.into_iter().map(ScriptValue::Str).collect())
        }
        ScriptValue::Ref(handle) => materialize(ctx, bindings, handle),
    }
}

/// 集合在脚本侧只能查询大小和成员
fn set_object<'js>(ctx: &Ctx<'js>, tag: &'static str, items: Vec<ScriptValue>) -> rquickjs::Result<Value<'js>> {
    let object = Object::new(ctx.clone())?;
    let array = Array::new(ctx.clone())?;
    for (index, item) in items.iter().enumerate() {
        let value = match item {
            ScriptValue::Int(v) => i64_to_js(ctx, *v),
            ScriptValue::Str(v) => v.as_str().into_js(ctx)?,
            _ => Value::new_null(ctx.clone()),
        };
        array.set(index, value)?;
    }
    object.set(CONTAINER_TAG, tag)?;
    object.set(CONTAINER_ITEMS, array)?;
    object.set("size", items.len() as i32)?;
    // 成员按数值或字符串比较，整值浮点数与整数等同
    let ints: BTreeSet<i64> = items.iter().filter_map(ScriptValue::as_int).collect();
    let strings: BTreeSet<String> = items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect();
    object.set(
        "contains",
        Function::new(ctx.clone(), move |item: Value<'js>| -> bool {
            from_js(&item).is_some_and(|item| {
                item.as_int().is_some_and(|v| ints.contains(&v))
                    || item.as_str().is_some_and(|s| strings.contains(s))
            })
        })?,
    )?;
    Ok(object.into_value())
}

fn i64_to_js<'js>(ctx: &Ctx<'js>, v: i64) -> Value<'js> {
    match i32::try_from(v) {
        Ok(small) => Value::new_int(ctx.clone(), small),
        Err(_) => Value::new_float(ctx.clone(), v as f64),
    }
}

fn script_args(ctx: &Ctx<'_>, name: &str, args: &[Value<'_>]) -> rquickjs::Result<Vec<ScriptValue>> {
    args.iter()
        .enumerate()
        .map(|(index, value)| {
            from_js(value).ok_or_else(|| {
                throw(
                    ctx,
                    BindingError::ArgumentType {
                        name: name.to_string(),
                        index,
                        expected: "a number, string, bool, list or set",
                    },
                )
            })
        })
        .collect()
}

/// 物化引擎对象；对象已不存在时返回 `null`
pub fn materialize<'js>(ctx: &Ctx<'js>, bindings: &Bindings, handle: ObjectRef) -> rquickjs::Result<Value<'js>> {
    let manifest = Rc::clone(&bindings.manifest);
    let Some(class) = bindings.context.read(|iface| class_name_of(iface, &handle)) else {
        return Ok(Value::new_null(ctx.clone()));
    };
    let members = manifest.members_of(class);

    // 一次借用内复制全部属性，转换时不再持有接口
    let fields: Vec<_> = bindings.context.read(|iface| {
        members
            .iter()
            .filter(|member| !member.is_method())
            .map(|member| (member.name, member.invoke(iface, &handle, &[])))
            .collect()
    });

    let object = Object::new(ctx.clone())?;
    object.set(CLASS_TAG, class)?;
    for (name, value) in fields {
        let value = value.map_err(|err| throw(ctx, err))?;
        object.set(name, to_js(ctx, bindings, value)?)?;
    }
    for member in members.iter().filter(|member| member.is_method()) {
        object.set(
            member.name,
            method_function(ctx, bindings, class, member.name, handle.clone())?,
        )?;
    }
    Ok(object.into_value())
}

fn method_function<'js>(
    ctx: &Ctx<'js>,
    bindings: &Bindings,
    class: &'static str,
    member: &'static str,
    handle: ObjectRef,
) -> rquickjs::Result<Function<'js>> {
    let bindings = bindings.clone();
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
            let values = script_args(&ctx, member, &args.0)?;
            let result = bindings.context.read(|iface| {
                bindings
                    .manifest
                    .member(class, member)
                    .ok_or_else(|| BindingError::StaleHandle(format!("{}.{}", class, member)))
                    .and_then(|m| m.invoke(iface, &handle, &values))
            });
            let value = result.map_err(|err| throw(&ctx, err))?;
            to_js(&ctx, &bindings, value)
        },
    )
}

fn free_function<'js>(ctx: &Ctx<'js>, bindings: &Bindings, name: &'static str) -> rquickjs::Result<Function<'js>> {
    let bindings = bindings.clone();
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
            let values = script_args(&ctx, name, &args.0)?;
            let Some(function) = bindings.manifest.function(name) else {
                return Err(throw(
                    &ctx,
                    BindingError::NoOverload {
                        name: name.to_string(),
                        given: values.len(),
                    },
                ));
            };
            // 原生函数自行借用接口，这里不持有借用
            let value = function
                .dispatch(&bindings.context, &values)
                .map_err(|err| throw(&ctx, err))?;
            to_js(&ctx, &bindings, value)
        },
    )
}

/// 单个列表实参视为元素列表：`IntSet([1, 2])` 与 `IntSet(1, 2)` 等价
fn flatten_single_list(mut values: Vec<ScriptValue>) -> Vec<ScriptValue> {
    if let [ScriptValue::List(_)] = values.as_slice() {
        if let Some(ScriptValue::List(items)) = values.pop() {
            return items;
        }
    }
    values
}

fn container_constructor<'js>(
    ctx: &Ctx<'js>,
    bindings: &Bindings,
    name: &'static str,
) -> rquickjs::Result<Function<'js>> {
    let bindings = bindings.clone();
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
            let values = flatten_single_list(script_args(&ctx, name, &args.0)?);
            let container = bindings.manifest.container(name).ok_or_else(|| {
                throw(
                    &ctx,
                    BindingError::NoOverload {
                        name: name.to_string(),
                        given: values.len(),
                    },
                )
            })?;
            let value = container.build(&values).map_err(|err| throw(&ctx, err))?;
            to_js(&ctx, &bindings, value)
        },
    )
}

/// 类对象只携带常量和基类列表，不能实例化
fn class_object<'js>(ctx: &Ctx<'js>, bindings: &Bindings, class: &'static str) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;
    let manifest = &bindings.manifest;
    let bases = Array::new(ctx.clone())?;
    for (index, binding) in manifest.lineage(class).iter().skip(1).enumerate() {
        bases.set(index, binding.name)?;
    }
    object.set("__bases", bases)?;
    for member in manifest.members_of(class) {
        if member.kind == MemberKind::Constant {
            let value = bindings
                .context
                .read(|iface| member.invoke(iface, &ObjectRef::Universe, &[]))
                .map_err(|err| throw(ctx, err))?;
            object.set(member.name, to_js(ctx, bindings, value)?)?;
        }
    }
    Ok(object)
}

fn display_value(value: &Value<'_>) -> String {
    if value.is_undefined() {
        return "undefined".to_string();
    }
    match from_js(value) {
        Some(value) => value.to_string(),
        None if value.is_function() => "[function]".to_string(),
        None => "[object Object]".to_string(),
    }
}

fn console_line(args: &[Value<'_>]) -> String {
    args.iter().map(display_value).collect::<Vec<_>>().join(" ")
}

fn install_console<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;
    console.set(
        "log",
        Function::new(ctx.clone(), |args: Rest<Value<'js>>| {
            tracing::info!(target: "ai.script", "{}", console_line(&args.0));
        })?,
    )?;
    console.set(
        "info",
        Function::new(ctx.clone(), |args: Rest<Value<'js>>| {
            tracing::info!(target: "ai.script", "{}", console_line(&args.0));
        })?,
    )?;
    console.set(
        "debug",
        Function::new(ctx.clone(), |args: Rest<Value<'js>>| {
            tracing::debug!(target: "ai.script", "{}", console_line(&args.0));
        })?,
    )?;
    console.set(
        "warn",
        Function::new(ctx.clone(), |args: Rest<Value<'js>>| {
            tracing::warn!(target: "ai.script", "{}", console_line(&args.0));
        })?,
    )?;
    console.set(
        "error",
        Function::new(ctx.clone(), |args: Rest<Value<'js>>| {
            tracing::error!(target: "ai.script", "{}", console_line(&args.0));
        })?,
    )?;
    ctx.globals().set("console", console)?;
    Ok(())
}

/// 注册全部绑定，返回以 `interface_name` 挂在全局的接口对象
pub fn install<'js>(ctx: &Ctx<'js>, bindings: &Bindings, interface_name: &str) -> rquickjs::Result<Object<'js>> {
    let module = Object::new(ctx.clone())?;
    let manifest = &bindings.manifest;

    for function in &manifest.functions {
        module.set(function.name, free_function(ctx, bindings, function.name)?)?;
    }

    for binding in &manifest.enums {
        let values = Object::new(ctx.clone())?;
        for (name, value) in &binding.values {
            values.set(*name, *value)?;
        }
        module.set(binding.name, values)?;
    }

    for container in &manifest.containers {
        module.set(container.name, container_constructor(ctx, bindings, container.name)?)?;
    }

    for class in &manifest.classes {
        module.set(class.name, class_object(ctx, bindings, class.name)?)?;
    }

    ctx.globals().set(interface_name, module.clone())?;
    install_console(ctx)?;

    tracing::debug!(
        target: "bindings",
        "Installed '{}': {} functions, {} classes, {} enums, {} containers",
        interface_name,
        manifest.functions.len(),
        manifest.classes.len(),
        manifest.enums.len(),
        manifest.containers.len()
    );
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::context::TurnSignal;
    use crate::interface::LocalClient;
    use crate::testing::{sample_client, shared};
    use rquickjs::{CatchResultExt, Context, Runtime};
    use std::cell::RefCell;

    fn with_script<R>(client: &Rc<RefCell<LocalClient>>, f: impl FnOnce(&Ctx<'_>) -> R) -> R {
        let runtime = Runtime::new().expect("runtime");
        let context = Context::full(&runtime).expect("context");
        let bindings = Bindings::new(
            Rc::new(BindingManifest::standard()),
            BindingContext::new(shared(client), TurnSignal::new()),
        );
        context.with(|ctx| {
            install(&ctx, &bindings, "fo").expect("install bindings");
            f(&ctx)
        })
    }

    fn eval_string(ctx: &Ctx<'_>, source: &str) -> String {
        match ctx.eval::<String, _>(source).catch(ctx) {
            Ok(value) => value,
            Err(err) => panic!("script failed: {}", err),
        }
    }

    #[test]
    fn test_overloaded_free_functions() {
        let client = sample_client();
        with_script(&client, |ctx| {
            assert_eq!(eval_string(ctx, "fo.PlayerName()"), "AI_1");
            assert_eq!(eval_string(ctx, "fo.PlayerName(2)"), "Human");
            assert_eq!(
                eval_string(ctx, "fo.GetEmpire().name + '|' + fo.GetEmpire(2).name"),
                "Empire of AI_1|Human Empire"
            );
            let message = eval_string(
                ctx,
                "try { fo.PlayerName(1, 2); 'no error' } catch (e) { e.message }",
            );
            assert!(message.contains("No overload of PlayerName()"), "{}", message);
        });
    }

    #[test]
    fn test_planet_materializes_lineage() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let summary = eval_string(
                ctx,
                "var p = fo.GetUniverse().GetPlanet(10); \
                 [p.__class, p.name, p.id, p.inhabitants, p.primaryFocus, p.ageInTurns].join(',')",
            );
            assert_eq!(summary, "Planet,Earth,10,12,3,5");
            assert_eq!(eval_string(ctx, "String(fo.GetUniverse().GetPlanet(30))"), "null");
        });
    }

    #[test]
    fn test_enum_values_round_trip() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let same: bool = ctx
                .eval("fo.GetUniverse().GetPlanet(10).type === fo.PlanetType.Terran")
                .expect("eval");
            assert!(same);
            let meter: f64 = ctx
                .eval("fo.GetUniverse().GetPlanet(10).GetMeter(fo.MeterType.Industry)")
                .expect("eval");
            assert_eq!(meter, 8.5);
            let status: i32 = ctx
                .eval("fo.GetEmpire().GetTechStatus('LRN_PHYS_BRAIN')")
                .expect("eval");
            assert_eq!(status, 1);
        });
    }

    #[test]
    fn test_sets_need_explicit_conversion() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let result = eval_string(
                ctx,
                "var s = fo.GetUniverse().GetFleet(30).shipIDs; \
                 [s.size, s.contains(40), s.contains(42), fo.IntSetToIntVector(s).join('/')].join(',')",
            );
            assert_eq!(result, "2,true,false,40/41");
            assert_eq!(
                eval_string(ctx, "fo.StringSetToStringVector(fo.StringSet(['b', 'a', 'b'])).join()"),
                "a,b"
            );
            assert_eq!(eval_string(ctx, "fo.IntSetToIntVector(fo.IntSet(5, 2)).join()"), "2,5");
        });
    }

    #[test]
    fn test_set_membership_matches_computed_ids() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let result = eval_string(
                ctx,
                "var fleet = fo.GetUniverse().GetFleet(30); var id = 40.5 - 0.5; \
                 [fleet.shipIDs.contains(id), fleet.ContainsShipID(id), fleet.shipIDs.contains(40.5), \
                  fleet.shipIDs.contains('40')].join(',')",
            );
            assert_eq!(result, "true,true,false,false");
            assert_eq!(
                eval_string(ctx, "String(fo.StringSet(['a']).contains('a')) + fo.StringSet(['a']).contains(1)"),
                "truefalse"
            );
        });
    }

    #[test]
    fn test_age_of_ancient_object_saturates() {
        let client = sample_client();
        if let Some(fleet) = client.borrow_mut().snapshot_mut().universe.object_mut(30) {
            fleet.creation_turn = i32::MIN;
        }
        with_script(&client, |ctx| {
            let age: i32 = ctx.eval("fo.GetUniverse().GetFleet(30).ageInTurns").expect("eval");
            assert_eq!(age, i32::MAX);
        });
    }

    #[test]
    fn test_methods_reresolve_handles() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let _: () = ctx
                .eval("var intruders = fo.GetUniverse().GetFleet(31);")
                .expect("eval");
            client.borrow_mut().snapshot_mut().universe.remove(31);
            let message = eval_string(
                ctx,
                "try { intruders.OwnedBy(2); 'alive' } catch (e) { e.message }",
            );
            assert_eq!(message, "UniverseObject 31 no longer exists");
            assert_eq!(eval_string(ctx, "intruders.name"), "Intruders");
        });
    }

    #[test]
    fn test_commands_reach_interface() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let accepted: i32 = ctx.eval("fo.IssueFleetMoveOrder(30, 2)").expect("eval");
            assert_eq!(accepted, 1);
            let message = eval_string(
                ctx,
                "try { fo.IssueFleetMoveOrder(30, 'two'); '' } catch (e) { e.message }",
            );
            assert_eq!(message, "IssueFleetMoveOrder(): argument 1 must be int");
            let _: () = ctx.eval("fo.DoneTurn(); fo.DoneTurn();").expect("eval");
        });
        assert_eq!(client.borrow().orders().len(), 1);
        assert_eq!(client.borrow().done_turn_count(), 1);
    }

    #[test]
    fn test_class_constants() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let id: i32 = ctx.eval("fo.Fleet.INVALID_OBJECT_ID").expect("eval");
            assert_eq!(id, -1);
            assert_eq!(eval_string(ctx, "fo.Planet.__bases.join()"), "UniverseObject,PopCenter,ResourceCenter");
        });
    }

    #[test]
    fn test_from_js_conversions() {
        let client = sample_client();
        with_script(&client, |ctx| {
            let value: Value = ctx.eval("[1, 2.5, 'x', null, true]").expect("eval");
            assert_eq!(
                from_js(&value),
                Some(ScriptValue::List(vec![
                    ScriptValue::Int(1),
                    ScriptValue::Float(2.5),
                    ScriptValue::from("x"),
                    ScriptValue::Null,
                    ScriptValue::Bool(true),
                ]))
            );
            let set: Value = ctx.eval("fo.IntSet([4, 1])").expect("eval");
            assert_eq!(from_js(&set), Some(ScriptValue::IntSet([1, 4].into_iter().collect())));
            let plain: Value = ctx.eval("({ a: 1 })").expect("eval");
            assert_eq!(from_js(&plain), None);
        });
    }
}
