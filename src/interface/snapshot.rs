use crate::core::{AiError, AiResult};
use crate::universe::{Empire, RuleTables, Universe};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 玩家信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: i32,
    pub name: String,
    pub empire_id: i32,
    #[serde(default)]
    pub is_ai: bool,
    #[serde(default)]
    pub is_host: bool,
}

/// 引擎在某一回合交给AI的完整状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// 本AI的玩家编号
    pub player_id: i32,
    pub current_turn: i32,
    pub players: Vec<PlayerInfo>,
    pub empires: Vec<Empire>,
    pub universe: Universe,
    #[serde(default)]
    pub rules: RuleTables,
}

impl GameSnapshot {
    pub fn from_json_str(content: &str) -> AiResult<Self> {
        serde_json::from_str(content).map_err(|e| AiError::Snapshot(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AiResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn player(&self, player_id: i32) -> Option<&PlayerInfo> {
        self.players.iter().find(|p| p.id == player_id)
    }
}
