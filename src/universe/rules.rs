//! 静态规则表：科技、建筑类型、特殊属性

use super::enums::{CaptureResult, TechType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 科技
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tech {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(rename = "type")]
    pub tech_type: TechType,
    #[serde(default)]
    pub category: String,
    pub research_cost: f64,
    pub research_turns: i32,
    #[serde(default)]
    pub prerequisites: BTreeSet<String>,
    #[serde(default)]
    pub unlocked_techs: BTreeSet<String>,
}

/// 建筑类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub build_cost: f64,
    pub build_time: i32,
    #[serde(default)]
    pub maintenance_cost: f64,
    #[serde(default = "default_capture_result")]
    pub capture_result: CaptureResult,
}

fn default_capture_result() -> CaptureResult {
    CaptureResult::Capture
}

/// 特殊属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Special {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// 规则表集合，进程生命周期内不变
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    #[serde(default, with = "named")]
    techs: BTreeMap<String, Tech>,
    #[serde(default, with = "named")]
    building_types: BTreeMap<String, BuildingType>,
    #[serde(default, with = "named")]
    specials: BTreeMap<String, Special>,
}

impl RuleTables {
    pub fn tech(&self, name: &str) -> Option<&Tech> {
        self.techs.get(name)
    }

    pub fn building_type(&self, name: &str) -> Option<&BuildingType> {
        self.building_types.get(name)
    }

    pub fn special(&self, name: &str) -> Option<&Special> {
        self.specials.get(name)
    }

    pub fn insert_tech(&mut self, tech: Tech) {
        self.techs.insert(tech.name.clone(), tech);
    }

    pub fn insert_building_type(&mut self, building_type: BuildingType) {
        self.building_types
            .insert(building_type.name.clone(), building_type);
    }

    pub fn insert_special(&mut self, special: Special) {
        self.specials.insert(special.name.clone(), special);
    }
}

/// 规则条目在JSON中以列表保存，载入时按名称建立索引
mod named {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub trait Named {
        fn name(&self) -> &str;
    }

    impl Named for super::Tech {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl Named for super::BuildingType {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl Named for super::Special {
        fn name(&self) -> &str {
            &self.name
        }
    }

    pub fn serialize<T, S>(map: &BTreeMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        T: DeserializeOwned + Named,
        D: Deserializer<'de>,
    {
        let entries = Vec::<T>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.name().to_string(), entry))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_tables_from_json() {
        let rules: RuleTables = serde_json::from_str(
            r#"{
                "techs": [
                    { "name": "SHP_ZORTRIUM_PLATE", "type": "Application",
                      "research_cost": 48.0, "research_turns": 4,
                      "prerequisites": ["SHP_MIL_ROBO_CONT"] }
                ],
                "building_types": [
                    { "name": "BLD_SHIPYARD_BASE", "build_cost": 10.0, "build_time": 4 }
                ]
            }"#,
        )
        .unwrap();

        let tech = rules.tech("SHP_ZORTRIUM_PLATE").unwrap();
        assert_eq!(tech.tech_type, TechType::Application);
        assert!(tech.prerequisites.contains("SHP_MIL_ROBO_CONT"));

        let shipyard = rules.building_type("BLD_SHIPYARD_BASE").unwrap();
        assert_eq!(shipyard.capture_result, CaptureResult::Capture);
        assert!(rules.special("NOPE").is_none());
    }

    #[test]
    fn test_serializes_entries_as_lists() {
        let mut rules = RuleTables::default();
        rules.insert_special(Special {
            name: "ECCENTRIC_ORBIT_SPECIAL".to_string(),
            description: "Orbit varies".to_string(),
        });
        let json = serde_json::to_value(&rules).unwrap();
        assert!(json["specials"].is_array());
        let parsed: RuleTables = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, rules);
    }
}
