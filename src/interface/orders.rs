//! AI 下达的命令与聊天消息

use serde::{Deserialize, Serialize};

/// 已被接受的命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Order {
    FleetMove {
        fleet_id: i32,
        destination_id: i32,
    },
    Rename {
        object_id: i32,
        new_name: String,
    },
    NewFleet {
        fleet_name: String,
        new_fleet_id: i32,
        ship_id: i32,
    },
    FleetColonize {
        ship_id: i32,
        planet_id: i32,
    },
}

/// 发出的聊天消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub recipient_player_id: i32,
    pub text: String,
}
