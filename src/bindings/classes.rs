//! 对脚本可见的类型及其成员表
//!
//! 成员名沿用引擎脚本接口的命名（`empireID`、`GetFleet`、`shipIDs` 等）。
//! 属性在取用对象时复制；方法每次调用都通过 [`Resolve`] 重新解析句柄，对象
//! 已不存在时抛出异常。

use super::manifest::{ClassBinding, EnumBinding, Member, ReturnPolicy};
use super::value::{Args, ObjectRef, ScriptValue};
use crate::core::BindingResult;
use crate::interface::AiInterface;
use crate::universe::{
    Building, BuildingType, CaptureResult, Empire, FocusType, Fleet, MeterType, Planet,
    PlanetEnvironment, PlanetSize, PlanetType, Ship, Special, StarType, System, Tech, TechStatus,
    TechType, Universe, UniverseObject, INVALID_OBJECT_AGE, INVALID_OBJECT_ID,
};

/// 由句柄取回引擎持有的对象
pub trait Resolve {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self>;
}

impl Resolve for Empire {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
        match handle {
            ObjectRef::Empire(id) => iface.empire(*id),
            _ => None,
        }
    }
}

impl Resolve for Universe {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
        match handle {
            ObjectRef::Universe => Some(iface.universe()),
            _ => None,
        }
    }
}

impl Resolve for UniverseObject {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
        match handle {
            ObjectRef::Object(id) => iface.universe().object(*id),
            _ => None,
        }
    }
}

macro_rules! resolve_kind {
    ($($kind:ty => $accessor:ident),+ $(,)?) => {
        $(
            impl Resolve for $kind {
                fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
                    UniverseObject::resolve(iface, handle).and_then(|obj| obj.$accessor())
                }
            }
        )+
    };
}

resolve_kind! {
    Fleet => as_fleet,
    Ship => as_ship,
    Planet => as_planet,
    System => as_system,
    Building => as_building,
}

impl Resolve for BuildingType {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
        match handle {
            ObjectRef::BuildingType(name) => iface.rules().building_type(name),
            _ => None,
        }
    }
}

impl Resolve for Tech {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
        match handle {
            ObjectRef::Tech(name) => iface.rules().tech(name),
            _ => None,
        }
    }
}

impl Resolve for Special {
    fn resolve<'a>(iface: &'a dyn AiInterface, handle: &ObjectRef) -> Option<&'a Self> {
        match handle {
            ObjectRef::Special(name) => iface.rules().special(name),
            _ => None,
        }
    }
}

/// 句柄对应的脚本类名；对象已不存在时为 `None`
pub fn class_name_of(iface: &dyn AiInterface, handle: &ObjectRef) -> Option<&'static str> {
    match handle {
        ObjectRef::Empire(id) => iface.empire(*id).map(|_| "Empire"),
        ObjectRef::Universe => Some("Universe"),
        ObjectRef::Object(id) => iface.universe().object(*id).map(UniverseObject::class_name),
        ObjectRef::BuildingType(name) => iface.rules().building_type(name).map(|_| "BuildingType"),
        ObjectRef::Tech(name) => iface.rules().tech(name).map(|_| "Tech"),
        ObjectRef::Special(name) => iface.rules().special(name).map(|_| "Special"),
    }
}

fn prop<T: Resolve + 'static>(
    name: &'static str,
    get: fn(&T, &dyn AiInterface) -> ScriptValue,
) -> Member {
    Member::property(name, ReturnPolicy::ByValue, get)
}

fn const_ref<T: Resolve + 'static>(
    name: &'static str,
    get: fn(&T, &dyn AiInterface) -> ScriptValue,
) -> Member {
    Member::property(name, ReturnPolicy::CopyConstRef, get)
}

fn method<T: Resolve + 'static>(
    name: &'static str,
    arity: usize,
    call: fn(&T, &dyn AiInterface, &Args<'_>) -> BindingResult<ScriptValue>,
) -> Member {
    Member::method(name, ReturnPolicy::ByValue, arity, call)
}

fn reference<T: Resolve + 'static>(
    name: &'static str,
    arity: usize,
    call: fn(&T, &dyn AiInterface, &Args<'_>) -> BindingResult<ScriptValue>,
) -> Member {
    Member::method(name, ReturnPolicy::ExistingReference, arity, call)
}

fn object_ref(found: bool, id: i32) -> ScriptValue {
    ScriptValue::optional_ref(found.then_some(ObjectRef::Object(id)))
}

fn empire_class() -> ClassBinding {
    ClassBinding::new("Empire")
        .member(const_ref("name", |e: &Empire, _| e.name.as_str().into()))
        .member(const_ref("playerName", |e: &Empire, _| e.player_name.as_str().into()))
        .member(prop("empireID", |e: &Empire, _| e.id.into()))
        .member(prop("homeworldID", |e: &Empire, _| e.homeworld_id.into()))
        .member(prop("capitolID", |e: &Empire, _| e.capitol_id.into()))
        .member(method("BuildingTypeAvailable", 1, |e: &Empire, _, args| {
            Ok(e.building_type_available(args.string(0)?).into())
        }))
        .member(Member::method(
            "AvailableBuildingTypes",
            ReturnPolicy::CopyConstRef,
            0,
            |e: &Empire, _, _| Ok((&e.available_building_types).into()),
        ))
        .member(method("TechResearched", 1, |e: &Empire, _, args| {
            Ok(e.tech_researched(args.string(0)?).into())
        }))
        .member(Member::method(
            "AvailableTechs",
            ReturnPolicy::CopyConstRef,
            0,
            |e: &Empire, _, _| Ok((&e.researched_techs).into()),
        ))
        .member(method("GetTechStatus", 1, |e: &Empire, iface, args| {
            let status = e.tech_status(args.string(0)?, iface.rules());
            Ok(ScriptValue::from_enum(status))
        }))
        .member(method("ResearchStatus", 1, |e: &Empire, _, args| {
            Ok(e.research_status(args.string(0)?).into())
        }))
        .member(method("HasExploredSystem", 1, |e: &Empire, _, args| {
            Ok(e.has_explored_system(args.int(0)?).into())
        }))
}

fn universe_class() -> ClassBinding {
    ClassBinding::new("Universe")
        .member(reference("GetObject", 1, |u: &Universe, _, args| {
            let id = args.int(0)?;
            Ok(object_ref(u.object(id).is_some(), id))
        }))
        .member(reference("GetFleet", 1, |u: &Universe, _, args| {
            let id = args.int(0)?;
            Ok(object_ref(u.fleet(id).is_some(), id))
        }))
        .member(reference("GetShip", 1, |u: &Universe, _, args| {
            let id = args.int(0)?;
            Ok(object_ref(u.ship(id).is_some(), id))
        }))
        .member(reference("GetPlanet", 1, |u: &Universe, _, args| {
            let id = args.int(0)?;
            Ok(object_ref(u.planet(id).is_some(), id))
        }))
        .member(reference("GetSystem", 1, |u: &Universe, _, args| {
            let id = args.int(0)?;
            Ok(object_ref(u.system(id).is_some(), id))
        }))
        .member(reference("GetBuilding", 1, |u: &Universe, _, args| {
            let id = args.int(0)?;
            Ok(object_ref(u.building(id).is_some(), id))
        }))
        .member(reference("GetSpecial", 1, |_: &Universe, iface, args| {
            let name = args.string(0)?;
            let found = iface.rules().special(name).is_some();
            Ok(ScriptValue::optional_ref(
                found.then(|| ObjectRef::Special(name.to_string())),
            ))
        }))
        .member(prop("allObjectIDs", |u: &Universe, _| u.all_object_ids().into()))
        .member(method("SystemHasStarlane", 2, |u: &Universe, _, args| {
            Ok(u.system_has_starlane(args.int(0)?, args.int(1)?).into())
        }))
        .member(method("SystemsConnected", 3, |u: &Universe, _, args| {
            Ok(u.systems_connected(args.int(0)?, args.int(1)?, args.int(2)?).into())
        }))
}

fn universe_object_class() -> ClassBinding {
    ClassBinding::new("UniverseObject")
        .member(prop("id", |o: &UniverseObject, _| o.id.into()))
        .member(const_ref("name", |o: &UniverseObject, _| o.name.as_str().into()))
        .member(prop("x", |o: &UniverseObject, _| o.x.into()))
        .member(prop("y", |o: &UniverseObject, _| o.y.into()))
        .member(prop("systemID", |o: &UniverseObject, _| o.system_id.into()))
        .member(method("Unowned", 0, |o: &UniverseObject, _, _| Ok(o.unowned().into())))
        .member(method("OwnedBy", 1, |o: &UniverseObject, _, args| {
            Ok(o.owned_by(args.int(0)?).into())
        }))
        .member(method("WhollyOwnedBy", 1, |o: &UniverseObject, _, args| {
            Ok(o.wholly_owned_by(args.int(0)?).into())
        }))
        .member(prop("creationTurn", |o: &UniverseObject, _| o.creation_turn.into()))
        .member(prop("ageInTurns", |o: &UniverseObject, iface| {
            o.age_in_turns(iface.current_turn()).into()
        }))
        .member(const_ref("specials", |o: &UniverseObject, _| (&o.specials).into()))
        .member(method("GetMeter", 1, |o: &UniverseObject, _, args| {
            let meter = args.enum_value::<MeterType>(0)?;
            Ok(o.meter(meter).map(ScriptValue::from).unwrap_or(ScriptValue::Null))
        }))
        .member(Member::constant("INVALID_OBJECT_ID", || INVALID_OBJECT_ID.into()))
        .member(Member::constant("INVALID_OBJECT_AGE", || INVALID_OBJECT_AGE.into()))
}

fn fleet_class() -> ClassBinding {
    ClassBinding::new("Fleet")
        .base("UniverseObject")
        .member(prop("finalDestinationID", |f: &Fleet, _| f.final_destination_id.into()))
        .member(prop("nextSystemID", |f: &Fleet, _| f.next_system_id.into()))
        .member(prop("speed", |f: &Fleet, _| f.speed.into()))
        .member(prop("canChangeDirectionEnRoute", |f: &Fleet, _| {
            f.can_change_direction_en_route.into()
        }))
        .member(prop("hasArmedShips", |f: &Fleet, iface| {
            let universe = iface.universe();
            f.ship_ids
                .iter()
                .any(|id| universe.ship(*id).is_some_and(|(_, ship)| ship.is_armed))
                .into()
        }))
        .member(prop("numShips", |f: &Fleet, _| ScriptValue::Int(f.ship_ids.len() as i64)))
        .member(method("ContainsShipID", 1, |f: &Fleet, _, args| {
            Ok(f.ship_ids.contains(&args.int(0)?).into())
        }))
        .member(const_ref("shipIDs", |f: &Fleet, _| (&f.ship_ids).into()))
}

fn ship_class() -> ClassBinding {
    ClassBinding::new("Ship")
        .base("UniverseObject")
        .member(prop("fleetID", |s: &Ship, _| s.fleet_id.into()))
        .member(reference("GetFleet", 0, |s: &Ship, iface, _| {
            Ok(object_ref(iface.universe().fleet(s.fleet_id).is_some(), s.fleet_id))
        }))
        .member(prop("isArmed", |s: &Ship, _| s.is_armed.into()))
        .member(prop("speed", |s: &Ship, _| s.speed.into()))
}

fn building_class() -> ClassBinding {
    ClassBinding::new("Building")
        .base("UniverseObject")
        .member(reference("GetBuildingType", 0, |b: &Building, iface, _| {
            let found = iface.rules().building_type(&b.building_type).is_some();
            Ok(ScriptValue::optional_ref(
                found.then(|| ObjectRef::BuildingType(b.building_type.clone())),
            ))
        }))
        .member(prop("operating", |b: &Building, _| b.operating.into()))
        .member(reference("GetPlanet", 0, |b: &Building, iface, _| {
            Ok(object_ref(iface.universe().planet(b.planet_id).is_some(), b.planet_id))
        }))
}

fn building_type_class() -> ClassBinding {
    ClassBinding::new("BuildingType")
        .member(const_ref("name", |t: &BuildingType, _| t.name.as_str().into()))
        .member(const_ref("description", |t: &BuildingType, _| {
            t.description.as_str().into()
        }))
        .member(prop("buildCost", |t: &BuildingType, _| t.build_cost.into()))
        .member(prop("buildTime", |t: &BuildingType, _| t.build_time.into()))
        .member(prop("maintenanceCost", |t: &BuildingType, _| t.maintenance_cost.into()))
        .member(method("CaptureResult", 0, |t: &BuildingType, _, _| {
            Ok(ScriptValue::from_enum(t.capture_result))
        }))
}

fn resource_center_class() -> ClassBinding {
    ClassBinding::new("ResourceCenter")
        .member(prop("primaryFocus", |p: &Planet, _| ScriptValue::from_enum(p.primary_focus)))
        .member(prop("secondaryFocus", |p: &Planet, _| {
            ScriptValue::from_enum(p.secondary_focus)
        }))
}

fn pop_center_class() -> ClassBinding {
    ClassBinding::new("PopCenter")
        .member(prop("inhabitants", |p: &Planet, _| p.inhabitants.into()))
        .member(prop("availableFood", |p: &Planet, _| p.available_food.into()))
}

fn planet_class() -> ClassBinding {
    ClassBinding::new("Planet")
        .base("UniverseObject")
        .base("PopCenter")
        .base("ResourceCenter")
        .member(prop("size", |p: &Planet, _| ScriptValue::from_enum(p.size)))
        .member(prop("type", |p: &Planet, _| ScriptValue::from_enum(p.planet_type)))
        .member(const_ref("buildings", |p: &Planet, _| (&p.buildings).into()))
}

fn system_class() -> ClassBinding {
    ClassBinding::new("System")
        .base("UniverseObject")
        .member(prop("starType", |s: &System, _| ScriptValue::from_enum(s.star)))
        .member(prop("numOrbits", |s: &System, _| s.orbits.into()))
        .member(prop("numStarlanes", |s: &System, _| {
            ScriptValue::Int(s.starlanes.len() as i64)
        }))
        .member(prop("numWormholes", |s: &System, _| {
            ScriptValue::Int(s.wormholes.len() as i64)
        }))
        .member(method("HasStarlaneToSystemID", 1, |s: &System, _, args| {
            Ok(s.starlanes.contains(&args.int(0)?).into())
        }))
        .member(method("HasWormholeToSystemID", 1, |s: &System, _, args| {
            Ok(s.wormholes.contains(&args.int(0)?).into())
        }))
}

fn tech_class() -> ClassBinding {
    ClassBinding::new("Tech")
        .member(const_ref("Name", |t: &Tech, _| t.name.as_str().into()))
        .member(const_ref("Description", |t: &Tech, _| t.description.as_str().into()))
        .member(const_ref("ShortDescription", |t: &Tech, _| {
            t.short_description.as_str().into()
        }))
        .member(prop("Type", |t: &Tech, _| ScriptValue::from_enum(t.tech_type)))
        .member(const_ref("Category", |t: &Tech, _| t.category.as_str().into()))
        .member(prop("ResearchCost", |t: &Tech, _| t.research_cost.into()))
        .member(prop("ResearchTurns", |t: &Tech, _| t.research_turns.into()))
        .member(const_ref("Prerequisites", |t: &Tech, _| (&t.prerequisites).into()))
        .member(const_ref("UnlockedTechs", |t: &Tech, _| (&t.unlocked_techs).into()))
}

fn special_class() -> ClassBinding {
    ClassBinding::new("Special")
        .member(const_ref("Name", |s: &Special, _| s.name.as_str().into()))
        .member(const_ref("Description", |s: &Special, _| s.description.as_str().into()))
}

/// 全部类型，基类先于派生类声明
pub fn standard_classes() -> Vec<ClassBinding> {
    vec![
        empire_class(),
        universe_class(),
        universe_object_class(),
        fleet_class(),
        ship_class(),
        building_class(),
        building_type_class(),
        resource_center_class(),
        pop_center_class(),
        planet_class(),
        system_class(),
        tech_class(),
        special_class(),
    ]
}

pub fn standard_enums() -> Vec<EnumBinding> {
    vec![
        EnumBinding::of::<StarType>(),
        EnumBinding::of::<PlanetSize>(),
        EnumBinding::of::<PlanetType>(),
        EnumBinding::of::<PlanetEnvironment>(),
        EnumBinding::of::<TechType>(),
        EnumBinding::of::<TechStatus>(),
        EnumBinding::of::<MeterType>(),
        EnumBinding::of::<FocusType>(),
        EnumBinding::of::<CaptureResult>(),
    ]
}
