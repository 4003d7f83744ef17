//! 本地参考客户端
//!
//! 以 [`GameSnapshot`] 实现 [`AiInterface`]：按客户端发送前的规则校验命令，
//! 记录被接受的命令、聊天消息、日志和结束回合信号。CLI 宿主和测试使用它代替真实引擎。

use super::orders::{ChatMessage, Order};
use super::snapshot::GameSnapshot;
use super::{AiInterface, ALL_EMPIRES, INVALID_PLAYER_ID};
use crate::universe::{
    Empire, Fleet, ObjectKind, RuleTables, Universe, UniverseObject, INVALID_OBJECT_ID,
};
use std::collections::{BTreeMap, BTreeSet};

pub struct LocalClient {
    snapshot: GameSnapshot,
    orders: Vec<Order>,
    outbox: Vec<ChatMessage>,
    log: Vec<String>,
    done_turns: u32,
}

impl LocalClient {
    pub fn new(snapshot: GameSnapshot) -> Self {
        Self {
            snapshot,
            orders: Vec::new(),
            outbox: Vec::new(),
            log: Vec::new(),
            done_turns: 0,
        }
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    /// 回合之间由引擎更新的状态
    pub fn snapshot_mut(&mut self) -> &mut GameSnapshot {
        &mut self.snapshot
    }

    /// 本回合被接受的命令
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// 本回合发出的聊天消息
    pub fn outbox(&self) -> &[ChatMessage] {
        &self.outbox
    }

    /// 脚本通过 `LogOutput` 写入的日志
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// 本回合收到的结束回合信号次数
    pub fn done_turn_count(&self) -> u32 {
        self.done_turns
    }

    /// 进入下一回合，清空本回合状态
    pub fn advance_turn(&mut self) {
        self.snapshot.current_turn = self.snapshot.current_turn.saturating_add(1);
        self.orders.clear();
        self.outbox.clear();
        self.done_turns = 0;
    }

    fn my_empire_id(&self) -> i32 {
        self.player_empire_id(self.snapshot.player_id)
    }

    /// 对象存在且归本AI帝国所有
    fn owned_object(&self, object_id: i32) -> Option<&UniverseObject> {
        let empire_id = self.my_empire_id();
        self.snapshot
            .universe
            .object(object_id)
            .filter(|obj| obj.owned_by(empire_id))
    }

    fn reject(&self, order: &str, reason: &str) -> i32 {
        tracing::warn!(target: "ai", "{} rejected: {}", order, reason);
        0
    }
}

impl AiInterface for LocalClient {
    fn player_name(&self) -> String {
        self.player_name_of(self.snapshot.player_id)
    }

    fn player_name_of(&self, player_id: i32) -> String {
        self.snapshot
            .player(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn player_id(&self) -> i32 {
        self.snapshot.player_id
    }

    fn empire_player_id(&self, empire_id: i32) -> i32 {
        self.snapshot
            .players
            .iter()
            .find(|p| p.empire_id == empire_id)
            .map_or(INVALID_PLAYER_ID, |p| p.id)
    }

    fn all_player_ids(&self) -> Vec<i32> {
        self.snapshot.players.iter().map(|p| p.id).collect()
    }

    fn player_is_ai(&self, player_id: i32) -> bool {
        self.snapshot.player(player_id).is_some_and(|p| p.is_ai)
    }

    fn player_is_host(&self, player_id: i32) -> bool {
        self.snapshot.player(player_id).is_some_and(|p| p.is_host)
    }

    fn empire_id(&self) -> i32 {
        self.my_empire_id()
    }

    fn player_empire_id(&self, player_id: i32) -> i32 {
        self.snapshot
            .player(player_id)
            .map_or(ALL_EMPIRES, |p| p.empire_id)
    }

    fn all_empire_ids(&self) -> Vec<i32> {
        self.snapshot.empires.iter().map(|e| e.id).collect()
    }

    fn empire(&self, empire_id: i32) -> Option<&Empire> {
        self.snapshot.empires.iter().find(|e| e.id == empire_id)
    }

    fn universe(&self) -> &Universe {
        &self.snapshot.universe
    }

    fn rules(&self) -> &RuleTables {
        &self.snapshot.rules
    }

    fn current_turn(&self) -> i32 {
        self.snapshot.current_turn
    }

    fn issue_fleet_move_order(&mut self, fleet_id: i32, destination_id: i32) -> i32 {
        const ORDER: &str = "IssueFleetMoveOrder";
        match self.owned_object(fleet_id) {
            Some(obj) if obj.as_fleet().is_some() => {}
            _ => return self.reject(ORDER, &format!("no owned fleet {}", fleet_id)),
        }
        if self.snapshot.universe.system(destination_id).is_none() {
            return self.reject(ORDER, &format!("destination {} is not a system", destination_id));
        }
        self.orders.push(Order::FleetMove {
            fleet_id,
            destination_id,
        });
        1
    }

    fn issue_rename_order(&mut self, object_id: i32, new_name: &str) -> i32 {
        const ORDER: &str = "IssueRenameOrder";
        if new_name.trim().is_empty() {
            return self.reject(ORDER, "name is empty");
        }
        match self.owned_object(object_id) {
            Some(obj) if obj.name == new_name => {
                return self.reject(ORDER, "name unchanged");
            }
            Some(_) => {}
            None => return self.reject(ORDER, &format!("no owned object {}", object_id)),
        }
        if let Some(obj) = self.snapshot.universe.object_mut(object_id) {
            obj.name = new_name.to_string();
        }
        self.orders.push(Order::Rename {
            object_id,
            new_name: new_name.to_string(),
        });
        1
    }

    fn issue_new_fleet_order(&mut self, fleet_name: &str, ship_id: i32) -> i32 {
        const ORDER: &str = "IssueNewFleetOrder";
        if fleet_name.trim().is_empty() {
            return self.reject(ORDER, "fleet name is empty");
        }
        let (x, y, system_id, old_fleet_id) = match self.owned_object(ship_id) {
            Some(obj) => match obj.as_ship() {
                Some(ship) if obj.system_id != INVALID_OBJECT_ID => {
                    (obj.x, obj.y, obj.system_id, ship.fleet_id)
                }
                Some(_) => return self.reject(ORDER, "ship is not in a system"),
                None => return self.reject(ORDER, &format!("{} is not a ship", ship_id)),
            },
            None => return self.reject(ORDER, &format!("no owned ship {}", ship_id)),
        };

        let empire_id = self.my_empire_id();
        let Some(new_fleet_id) = self.snapshot.universe.next_free_id() else {
            return self.reject(ORDER, "no free object id");
        };
        let universe = &mut self.snapshot.universe;
        if let Some(ObjectKind::Fleet(old)) =
            universe.object_mut(old_fleet_id).map(|obj| &mut obj.kind)
        {
            old.ship_ids.remove(&ship_id);
        }
        if let Some(ObjectKind::Ship(ship)) = universe.object_mut(ship_id).map(|obj| &mut obj.kind)
        {
            ship.fleet_id = new_fleet_id;
        }
        universe.insert(UniverseObject {
            id: new_fleet_id,
            name: fleet_name.to_string(),
            x,
            y,
            system_id,
            owners: BTreeSet::from([empire_id]),
            creation_turn: self.snapshot.current_turn,
            specials: BTreeSet::new(),
            meters: BTreeMap::new(),
            kind: ObjectKind::Fleet(Fleet {
                final_destination_id: INVALID_OBJECT_ID,
                next_system_id: INVALID_OBJECT_ID,
                speed: 0.0,
                can_change_direction_en_route: true,
                ship_ids: BTreeSet::from([ship_id]),
            }),
        });

        self.orders.push(Order::NewFleet {
            fleet_name: fleet_name.to_string(),
            new_fleet_id,
            ship_id,
        });
        1
    }

    fn issue_fleet_colonize_order(&mut self, ship_id: i32, planet_id: i32) -> i32 {
        const ORDER: &str = "IssueFleetColonizeOrder";
        let ship_system = match self.owned_object(ship_id) {
            Some(obj) if obj.as_ship().is_some() => obj.system_id,
            _ => return self.reject(ORDER, &format!("no owned ship {}", ship_id)),
        };
        match self.snapshot.universe.planet(planet_id) {
            Some((planet, _)) if !planet.unowned() => {
                return self.reject(ORDER, &format!("planet {} is already owned", planet_id));
            }
            Some((planet, _)) if planet.system_id != ship_system => {
                return self.reject(ORDER, "ship and planet are in different systems");
            }
            Some(_) => {}
            None => return self.reject(ORDER, &format!("{} is not a planet", planet_id)),
        }
        self.orders.push(Order::FleetColonize { ship_id, planet_id });
        1
    }

    fn send_chat_message(&mut self, recipient_player_id: i32, message: &str) {
        self.outbox.push(ChatMessage {
            recipient_player_id,
            text: message.to_string(),
        });
    }

    fn done_turn(&mut self) {
        self.done_turns += 1;
        tracing::debug!(
            target: "ai",
            "Turn {} done ({} orders)",
            self.snapshot.current_turn,
            self.orders.len()
        );
    }

    fn log_output(&mut self, text: &str) {
        tracing::info!(target: "ai.script", "{}", text);
        self.log.push(text.to_string());
    }
}
