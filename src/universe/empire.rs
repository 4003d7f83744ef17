use super::enums::TechStatus;
use super::rules::RuleTables;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 帝国视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empire {
    pub id: i32,
    pub name: String,
    pub player_name: String,
    #[serde(default = "invalid_id")]
    pub homeworld_id: i32,
    #[serde(default = "invalid_id")]
    pub capitol_id: i32,
    #[serde(default)]
    pub available_building_types: BTreeSet<String>,
    #[serde(default)]
    pub researched_techs: BTreeSet<String>,
    /// 研究队列中的科技及已投入的研究点
    #[serde(default)]
    pub research_progress: BTreeMap<String, f64>,
    #[serde(default)]
    pub explored_systems: BTreeSet<i32>,
}

fn invalid_id() -> i32 {
    super::object::INVALID_OBJECT_ID
}

impl Empire {
    pub fn building_type_available(&self, name: &str) -> bool {
        self.available_building_types.contains(name)
    }

    pub fn tech_researched(&self, name: &str) -> bool {
        self.researched_techs.contains(name)
    }

    /// 科技状态：已完成、前置科技齐备则可研究，否则不可研究
    pub fn tech_status(&self, name: &str, rules: &RuleTables) -> TechStatus {
        if self.tech_researched(name) {
            return TechStatus::Complete;
        }
        match rules.tech(name) {
            Some(tech) if tech.prerequisites.iter().all(|p| self.tech_researched(p)) => {
                TechStatus::Researchable
            }
            _ => TechStatus::Unresearchable,
        }
    }

    /// 研究进度；不在研究队列中时为 -1
    pub fn research_status(&self, name: &str) -> f64 {
        self.research_progress.get(name).copied().unwrap_or(-1.0)
    }

    pub fn has_explored_system(&self, system_id: i32) -> bool {
        self.explored_systems.contains(&system_id)
    }
}
