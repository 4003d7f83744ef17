use super::object::{Building, Fleet, Planet, Ship, System, UniverseObject};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// 宇宙：按编号索引的对象注册表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<UniverseObject>", into = "Vec<UniverseObject>")]
pub struct Universe {
    objects: BTreeMap<i32, UniverseObject>,
}

impl From<Vec<UniverseObject>> for Universe {
    fn from(objects: Vec<UniverseObject>) -> Self {
        Self {
            objects: objects.into_iter().map(|obj| (obj.id, obj)).collect(),
        }
    }
}

impl From<Universe> for Vec<UniverseObject> {
    fn from(universe: Universe) -> Self {
        universe.objects.into_values().collect()
    }
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换对象
    pub fn insert(&mut self, object: UniverseObject) {
        self.objects.insert(object.id, object);
    }

    /// 移除已被销毁的对象
    pub fn remove(&mut self, id: i32) -> Option<UniverseObject> {
        self.objects.remove(&id)
    }

    pub fn object(&self, id: i32) -> Option<&UniverseObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: i32) -> Option<&mut UniverseObject> {
        self.objects.get_mut(&id)
    }

    pub fn fleet(&self, id: i32) -> Option<(&UniverseObject, &Fleet)> {
        self.object(id).and_then(|obj| obj.as_fleet().map(|f| (obj, f)))
    }

    pub fn ship(&self, id: i32) -> Option<(&UniverseObject, &Ship)> {
        self.object(id).and_then(|obj| obj.as_ship().map(|s| (obj, s)))
    }

    pub fn planet(&self, id: i32) -> Option<(&UniverseObject, &Planet)> {
        self.object(id).and_then(|obj| obj.as_planet().map(|p| (obj, p)))
    }

    pub fn system(&self, id: i32) -> Option<(&UniverseObject, &System)> {
        self.object(id).and_then(|obj| obj.as_system().map(|s| (obj, s)))
    }

    pub fn building(&self, id: i32) -> Option<(&UniverseObject, &Building)> {
        self.object(id).and_then(|obj| obj.as_building().map(|b| (obj, b)))
    }

    /// 所有对象编号（升序）
    pub fn all_object_ids(&self) -> Vec<i32> {
        self.objects.keys().copied().collect()
    }

    pub fn objects(&self) -> impl Iterator<Item = &UniverseObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// 下一个未被占用的对象编号
    pub fn next_free_id(&self) -> Option<i32> {
        match self.objects.keys().next_back() {
            Some(id) => id.checked_add(1),
            None => Some(0),
        }
    }

    /// 星系是否至少连接一条星道
    ///
    /// 快照不区分各帝国已知的星道，`_empire_id` 仅为保持脚本签名一致。
    pub fn system_has_starlane(&self, system_id: i32, _empire_id: i32) -> bool {
        self.system(system_id)
            .map(|(_, system)| !system.starlanes.is_empty())
            .unwrap_or(false)
    }

    /// 两个星系是否经由星道连通（广度优先搜索）
    pub fn systems_connected(&self, from_id: i32, to_id: i32, _empire_id: i32) -> bool {
        if self.system(from_id).is_none() || self.system(to_id).is_none() {
            return false;
        }
        if from_id == to_id {
            return true;
        }

        let mut visited = BTreeSet::from([from_id]);
        let mut queue = VecDeque::from([from_id]);
        while let Some(current) = queue.pop_front() {
            let Some((_, system)) = self.system(current) else {
                continue;
            };
            for &next in &system.starlanes {
                if next == to_id {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }
}
