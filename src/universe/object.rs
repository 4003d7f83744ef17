//! 宇宙对象
//!
//! 所有对象共享一组基础能力（编号、名称、位置、所有者、特殊属性、计量器），
//! 具体种类的数据放在 [`ObjectKind`] 中。

use super::enums::{FocusType, MeterType, PlanetSize, PlanetType, StarType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 无效对象编号
pub const INVALID_OBJECT_ID: i32 = -1;
/// 无效回合
pub const INVALID_GAME_TURN: i32 = -(1 << 15) + 1;
/// 无效对象年龄
pub const INVALID_OBJECT_AGE: i32 = -(1 << 30) - 1;

/// 宇宙对象基础视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseObject {
    pub id: i32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "invalid_id")]
    pub system_id: i32,
    #[serde(default)]
    pub owners: BTreeSet<i32>,
    #[serde(default = "invalid_turn")]
    pub creation_turn: i32,
    #[serde(default)]
    pub specials: BTreeSet<String>,
    #[serde(default)]
    pub meters: BTreeMap<MeterType, f64>,
    pub kind: ObjectKind,
}

fn invalid_id() -> i32 {
    INVALID_OBJECT_ID
}

fn invalid_turn() -> i32 {
    INVALID_GAME_TURN
}

/// 对象种类及其专有数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Fleet(Fleet),
    Ship(Ship),
    Planet(Planet),
    System(System),
    Building(Building),
}

impl ObjectKind {
    /// 脚本可见的类名
    pub fn class_name(&self) -> &'static str {
        match self {
            ObjectKind::Fleet(_) => "Fleet",
            ObjectKind::Ship(_) => "Ship",
            ObjectKind::Planet(_) => "Planet",
            ObjectKind::System(_) => "System",
            ObjectKind::Building(_) => "Building",
        }
    }
}

/// 舰队
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    #[serde(default = "invalid_id")]
    pub final_destination_id: i32,
    #[serde(default = "invalid_id")]
    pub next_system_id: i32,
    #[serde(default)]
    pub speed: f64,
    #[serde(default = "default_true")]
    pub can_change_direction_en_route: bool,
    #[serde(default)]
    pub ship_ids: BTreeSet<i32>,
}

fn default_true() -> bool {
    true
}

/// 舰船
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    #[serde(default = "invalid_id")]
    pub fleet_id: i32,
    #[serde(default)]
    pub is_armed: bool,
    #[serde(default)]
    pub speed: f64,
}

/// 行星（兼具人口中心与资源中心）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub size: PlanetSize,
    #[serde(rename = "type")]
    pub planet_type: PlanetType,
    #[serde(default)]
    pub buildings: BTreeSet<i32>,
    #[serde(default)]
    pub inhabitants: f64,
    #[serde(default)]
    pub available_food: f64,
    #[serde(default = "default_focus")]
    pub primary_focus: FocusType,
    #[serde(default = "default_focus")]
    pub secondary_focus: FocusType,
}

fn default_focus() -> FocusType {
    FocusType::Balanced
}

/// 星系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub star: StarType,
    #[serde(default)]
    pub orbits: i32,
    #[serde(default)]
    pub starlanes: BTreeSet<i32>,
    #[serde(default)]
    pub wormholes: BTreeSet<i32>,
}

/// 建筑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub building_type: String,
    #[serde(default = "invalid_id")]
    pub planet_id: i32,
    #[serde(default = "default_true")]
    pub operating: bool,
}

impl UniverseObject {
    pub fn unowned(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owned_by(&self, empire_id: i32) -> bool {
        self.owners.contains(&empire_id)
    }

    pub fn wholly_owned_by(&self, empire_id: i32) -> bool {
        self.owners.len() == 1 && self.owned_by(empire_id)
    }

    /// 对象年龄；创建回合未知时为 [`INVALID_OBJECT_AGE`]
    pub fn age_in_turns(&self, current_turn: i32) -> i32 {
        if self.creation_turn == INVALID_GAME_TURN {
            INVALID_OBJECT_AGE
        } else {
            current_turn.saturating_sub(self.creation_turn)
        }
    }

    pub fn meter(&self, meter: MeterType) -> Option<f64> {
        self.meters.get(&meter).copied()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn as_fleet(&self) -> Option<&Fleet> {
        match &self.kind {
            ObjectKind::Fleet(fleet) => Some(fleet),
            _ => None,
        }
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.kind {
            ObjectKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_planet(&self) -> Option<&Planet> {
        match &self.kind {
            ObjectKind::Planet(planet) => Some(planet),
            _ => None,
        }
    }

    pub fn as_system(&self) -> Option<&System> {
        match &self.kind {
            ObjectKind::System(system) => Some(system),
            _ => None,
        }
    }

    pub fn as_building(&self) -> Option<&Building> {
        match &self.kind {
            ObjectKind::Building(building) => Some(building),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(owners: &[i32], creation_turn: i32) -> UniverseObject {
        UniverseObject {
            id: 7,
            name: "Scout".to_string(),
            x: 1.0,
            y: 2.0,
            system_id: 3,
            owners: owners.iter().copied().collect(),
            creation_turn,
            specials: BTreeSet::new(),
            meters: BTreeMap::new(),
            kind: ObjectKind::Ship(Ship {
                fleet_id: 4,
                is_armed: false,
                speed: 75.0,
            }),
        }
    }

    #[test]
    fn test_ownership_queries() {
        assert!(ship(&[], 1).unowned());
        let shared = ship(&[1, 2], 1);
        assert!(shared.owned_by(2));
        assert!(!shared.wholly_owned_by(2));
        assert!(ship(&[2], 1).wholly_owned_by(2));
    }

    #[test]
    fn test_age_in_turns() {
        assert_eq!(ship(&[], 3).age_in_turns(10), 7);
        assert_eq!(
            ship(&[], INVALID_GAME_TURN).age_in_turns(10),
            INVALID_OBJECT_AGE
        );
        assert_eq!(ship(&[], i32::MIN).age_in_turns(10), i32::MAX);
        assert_eq!(ship(&[], i32::MAX).age_in_turns(-10), i32::MIN);
    }

    #[test]
    fn test_kind_accessors() {
        let obj = ship(&[1], 1);
        assert_eq!(obj.class_name(), "Ship");
        assert!(obj.as_ship().is_some());
        assert!(obj.as_fleet().is_none());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let obj: UniverseObject = serde_json::from_str(
            r#"{
                "id": 12, "name": "Sol", "x": 0.0, "y": 0.0,
                "kind": { "System": { "star": "Yellow", "starlanes": [13] } }
            }"#,
        )
        .unwrap();
        assert_eq!(obj.system_id, INVALID_OBJECT_ID);
        assert_eq!(obj.creation_turn, INVALID_GAME_TURN);
        let system = obj.as_system().unwrap();
        assert_eq!(system.star, StarType::Yellow);
        assert!(system.starlanes.contains(&13));
    }
}
