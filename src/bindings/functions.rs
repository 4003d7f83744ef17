//! 对脚本可见的自由函数
//!
//! 每个函数只是转发到 [`AiInterface`](crate::interface::AiInterface)。同名重载
//! （`PlayerName()` 与 `PlayerName(id)`，`GetEmpire()` 与 `GetEmpire(id)`）是各自
//! 独立的原生函数，由 [`FunctionBinding::dispatch`] 按实参个数选择。

use super::context::BindingContext;
use super::manifest::{FunctionBinding, ReturnPolicy};
use super::value::{set_to_vector, Args, ObjectRef, ScriptValue};
use crate::core::BindingResult;

use ReturnPolicy::{ByValue, CopyConstRef, ExistingReference};

fn player_name(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ctx.read(|iface| iface.player_name()).into())
}

fn player_name_of(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let player_id = args.int(0)?;
    Ok(ctx.read(|iface| iface.player_name_of(player_id)).into())
}

fn player_id(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ctx.read(|iface| iface.player_id()).into())
}

fn empire_player_id(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let empire_id = args.int(0)?;
    Ok(ctx.read(|iface| iface.empire_player_id(empire_id)).into())
}

fn all_player_ids(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ctx.read(|iface| iface.all_player_ids()).into())
}

fn player_is_ai(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let player_id = args.int(0)?;
    Ok(ctx.read(|iface| iface.player_is_ai(player_id)).into())
}

fn player_is_host(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let player_id = args.int(0)?;
    Ok(ctx.read(|iface| iface.player_is_host(player_id)).into())
}

fn empire_id(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ctx.read(|iface| iface.empire_id()).into())
}

fn player_empire_id(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let player_id = args.int(0)?;
    Ok(ctx.read(|iface| iface.player_empire_id(player_id)).into())
}

fn all_empire_ids(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ctx.read(|iface| iface.all_empire_ids()).into())
}

fn empire_handle(ctx: &BindingContext, empire_id: i32) -> ScriptValue {
    let found = ctx.read(|iface| iface.empire(empire_id).is_some());
    ScriptValue::optional_ref(found.then_some(ObjectRef::Empire(empire_id)))
}

fn get_own_empire(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    let empire_id = ctx.read(|iface| iface.empire_id());
    Ok(empire_handle(ctx, empire_id))
}

fn get_empire(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(empire_handle(ctx, args.int(0)?))
}

fn get_universe(_: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ObjectRef::Universe.into())
}

fn get_tech(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let name = args.string(0)?;
    let found = ctx.read(|iface| iface.rules().tech(name).is_some());
    Ok(ScriptValue::optional_ref(
        found.then(|| ObjectRef::Tech(name.to_string())),
    ))
}

fn get_building_type(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let name = args.string(0)?;
    let found = ctx.read(|iface| iface.rules().building_type(name).is_some());
    Ok(ScriptValue::optional_ref(
        found.then(|| ObjectRef::BuildingType(name.to_string())),
    ))
}

fn current_turn(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    Ok(ctx.read(|iface| iface.current_turn()).into())
}

fn issue_fleet_move_order(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let (fleet_id, destination_id) = (args.int(0)?, args.int(1)?);
    Ok(ctx
        .write(|iface| iface.issue_fleet_move_order(fleet_id, destination_id))
        .into())
}

fn issue_rename_order(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let (object_id, new_name) = (args.int(0)?, args.string(1)?);
    Ok(ctx
        .write(|iface| iface.issue_rename_order(object_id, new_name))
        .into())
}

fn issue_new_fleet_order(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let (fleet_name, ship_id) = (args.string(0)?, args.int(1)?);
    Ok(ctx
        .write(|iface| iface.issue_new_fleet_order(fleet_name, ship_id))
        .into())
}

fn issue_fleet_colonize_order(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let (ship_id, planet_id) = (args.int(0)?, args.int(1)?);
    Ok(ctx
        .write(|iface| iface.issue_fleet_colonize_order(ship_id, planet_id))
        .into())
}

fn send_chat_message(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let (recipient, text) = (args.int(0)?, args.string(1)?);
    ctx.write(|iface| iface.send_chat_message(recipient, text));
    Ok(ScriptValue::Null)
}

fn done_turn(ctx: &BindingContext, _: &Args<'_>) -> BindingResult<ScriptValue> {
    if !ctx.turn().fire(ctx.interface()) {
        tracing::warn!(target: "bindings", "DoneTurn already signalled this turn, ignoring");
    }
    Ok(ScriptValue::Null)
}

fn log_output(ctx: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let text = args.string(0)?;
    ctx.write(|iface| iface.log_output(text));
    Ok(ScriptValue::Null)
}

fn int_set_to_int_vector(_: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let items = set_to_vector(args.int_set(0)?);
    Ok(ScriptValue::List(items.into_iter().map(ScriptValue::Int).collect()))
}

fn string_set_to_string_vector(_: &BindingContext, args: &Args<'_>) -> BindingResult<ScriptValue> {
    let items = set_to_vector(args.string_set(0)?);
    Ok(ScriptValue::List(items.into_iter().map(ScriptValue::Str).collect()))
}

/// 全部自由函数
pub fn standard_functions() -> Vec<FunctionBinding> {
    vec![
        FunctionBinding::new("PlayerName", CopyConstRef, 0, player_name).overload(1, player_name_of),
        FunctionBinding::new("PlayerID", ByValue, 0, player_id),
        FunctionBinding::new("EmpirePlayerID", ByValue, 1, empire_player_id),
        FunctionBinding::new("AllPlayerIDs", ByValue, 0, all_player_ids),
        FunctionBinding::new("PlayerIsAI", ByValue, 1, player_is_ai),
        FunctionBinding::new("PlayerIsHost", ByValue, 1, player_is_host),
        FunctionBinding::new("EmpireID", ByValue, 0, empire_id),
        FunctionBinding::new("PlayerEmpireID", ByValue, 1, player_empire_id),
        FunctionBinding::new("AllEmpireIDs", ByValue, 0, all_empire_ids),
        FunctionBinding::new("GetEmpire", ExistingReference, 0, get_own_empire).overload(1, get_empire),
        FunctionBinding::new("GetUniverse", ExistingReference, 0, get_universe),
        FunctionBinding::new("GetTech", ExistingReference, 1, get_tech),
        FunctionBinding::new("GetBuildingType", ExistingReference, 1, get_building_type),
        FunctionBinding::new("CurrentTurn", ByValue, 0, current_turn),
        FunctionBinding::new("IssueFleetMoveOrder", ByValue, 2, issue_fleet_move_order),
        FunctionBinding::new("IssueRenameOrder", ByValue, 2, issue_rename_order),
        FunctionBinding::new("IssueNewFleetOrder", ByValue, 2, issue_new_fleet_order),
        FunctionBinding::new("IssueFleetColonizeOrder", ByValue, 2, issue_fleet_colonize_order),
        FunctionBinding::new("SendChatMessage", ByValue, 2, send_chat_message),
        FunctionBinding::new("DoneTurn", ByValue, 0, done_turn),
        FunctionBinding::new("LogOutput", ByValue, 1, log_output),
        FunctionBinding::new("IntSetToIntVector", ByValue, 1, int_set_to_int_vector),
        FunctionBinding::new("StringSetToStringVector", ByValue, 1, string_set_to_string_vector),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::context::TurnSignal;
    use crate::bindings::BindingManifest;
    use crate::core::BindingError;
    use crate::interface::{LocalClient, Order};
    use crate::testing::{sample_client, shared};
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    struct Harness {
        client: Rc<RefCell<LocalClient>>,
        ctx: BindingContext,
        manifest: BindingManifest,
    }

    impl Harness {
        fn new() -> Self {
            let client = sample_client();
            let ctx = BindingContext::new(shared(&client), TurnSignal::new());
            Self {
                client,
                ctx,
                manifest: BindingManifest::standard(),
            }
        }

        fn call(&self, name: &str, values: &[ScriptValue]) -> BindingResult<ScriptValue> {
            self.manifest
                .function(name)
                .unwrap_or_else(|| panic!("{} is not bound", name))
                .dispatch(&self.ctx, values)
        }
    }

    #[test]
    fn test_identity_functions() {
        let h = Harness::new();
        assert_eq!(h.call("PlayerID", &[]), Ok(ScriptValue::Int(1)));
        assert_eq!(h.call("EmpireID", &[]), Ok(ScriptValue::Int(1)));
        assert_eq!(h.call("EmpirePlayerID", &[ScriptValue::Int(2)]), Ok(ScriptValue::Int(2)));
        assert_eq!(h.call("PlayerIsHost", &[ScriptValue::Int(2)]), Ok(ScriptValue::Bool(true)));
        assert_eq!(h.call("PlayerIsAI", &[ScriptValue::Int(2)]), Ok(ScriptValue::Bool(false)));
        assert_eq!(h.call("AllPlayerIDs", &[]), Ok(ScriptValue::from(vec![1, 2])));
        assert_eq!(h.call("CurrentTurn", &[]), Ok(ScriptValue::Int(5)));
    }

    #[test]
    fn test_get_empire_overloads() {
        let h = Harness::new();
        assert_eq!(h.call("GetEmpire", &[]), Ok(ScriptValue::Ref(ObjectRef::Empire(1))));
        assert_eq!(
            h.call("GetEmpire", &[ScriptValue::Int(2)]),
            Ok(ScriptValue::Ref(ObjectRef::Empire(2)))
        );
        assert_eq!(h.call("GetEmpire", &[ScriptValue::Int(9)]), Ok(ScriptValue::Null));
        assert_eq!(h.call("GetUniverse", &[]), Ok(ScriptValue::Ref(ObjectRef::Universe)));
    }

    #[test]
    fn test_rule_lookups() {
        let h = Harness::new();
        assert_eq!(
            h.call("GetTech", &[ScriptValue::from("LRN_PHYS_BRAIN")]),
            Ok(ScriptValue::Ref(ObjectRef::Tech("LRN_PHYS_BRAIN".to_string())))
        );
        assert_eq!(h.call("GetTech", &[ScriptValue::from("NOPE")]), Ok(ScriptValue::Null));
        assert_eq!(
            h.call("GetBuildingType", &[ScriptValue::from("BLD_SHIPYARD_BASE")]),
            Ok(ScriptValue::Ref(ObjectRef::BuildingType("BLD_SHIPYARD_BASE".to_string())))
        );
    }

    #[test]
    fn test_orders_forward_to_interface() {
        let h = Harness::new();
        assert_eq!(
            h.call("IssueFleetMoveOrder", &[ScriptValue::Int(30), ScriptValue::Int(2)]),
            Ok(ScriptValue::Int(1))
        );
        assert_eq!(
            h.call("IssueFleetMoveOrder", &[ScriptValue::Int(31), ScriptValue::Int(2)]),
            Ok(ScriptValue::Int(0))
        );
        assert_eq!(
            h.call("IssueRenameOrder", &[ScriptValue::Int(30), ScriptValue::Int(2)]),
            Err(BindingError::ArgumentType {
                name: "IssueRenameOrder".to_string(),
                index: 1,
                expected: "string",
            })
        );
        assert_eq!(
            h.client.borrow().orders(),
            [Order::FleetMove {
                fleet_id: 30,
                destination_id: 2,
            }]
        );

        h.call("SendChatMessage", &[ScriptValue::Int(2), ScriptValue::from("hi")])
            .expect("chat");
        assert_eq!(h.client.borrow().outbox().len(), 1);
        h.call("LogOutput", &[ScriptValue::from("thinking")]).expect("log");
        assert_eq!(h.client.borrow().log_lines(), ["thinking".to_string()]);
    }

    #[test]
    fn test_done_turn_is_forwarded_once() {
        let h = Harness::new();
        h.call("DoneTurn", &[]).expect("first");
        h.call("DoneTurn", &[]).expect("second");
        assert_eq!(h.client.borrow().done_turn_count(), 1);
        assert!(h.ctx.turn().is_done());
    }

    #[test]
    fn test_set_conversions() {
        let h = Harness::new();
        let ids: BTreeSet<i64> = [30, 4, 12].into_iter().collect();
        assert_eq!(
            h.call("IntSetToIntVector", &[ScriptValue::IntSet(ids)]),
            Ok(ScriptValue::List(vec![
                ScriptValue::Int(4),
                ScriptValue::Int(12),
                ScriptValue::Int(30),
            ]))
        );
        let names: BTreeSet<String> = ["b".to_string(), "a".to_string()].into_iter().collect();
        assert_eq!(
            h.call("StringSetToStringVector", &[ScriptValue::StringSet(names)]),
            Ok(ScriptValue::List(vec![ScriptValue::from("a"), ScriptValue::from("b")]))
        );
        assert!(h.call("IntSetToIntVector", &[ScriptValue::Int(3)]).is_err());
    }
}
