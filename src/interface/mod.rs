//! 引擎的AI命令接口
//!
//! [`AiInterface`] 是引擎交给AI的全部能力：身份查询、宇宙与规则查询、下达命令、
//! 聊天、结束回合和日志。绑定层只转发这些调用，不增加任何语义。

pub mod client;
pub mod orders;
pub mod snapshot;

pub use client::LocalClient;
pub use orders::{ChatMessage, Order};
pub use snapshot::{GameSnapshot, PlayerInfo};

use crate::universe::{Empire, RuleTables, Universe};
use std::cell::RefCell;
use std::rc::Rc;

/// 无效玩家编号
pub const INVALID_PLAYER_ID: i32 = -1;
/// 表示"所有帝国"或无帝国的编号
pub const ALL_EMPIRES: i32 = -1;

/// 脚本与宿主共享的接口句柄
pub type SharedInterface = Rc<RefCell<dyn AiInterface>>;

/// 引擎面向AI的接口
pub trait AiInterface {
    /// 当前AI玩家的名称
    fn player_name(&self) -> String;

    /// 指定玩家的名称；未知玩家返回空串
    fn player_name_of(&self, player_id: i32) -> String;

    fn player_id(&self) -> i32;

    /// 控制该帝国的玩家；无则为 [`INVALID_PLAYER_ID`]
    fn empire_player_id(&self, empire_id: i32) -> i32;

    fn all_player_ids(&self) -> Vec<i32>;

    fn player_is_ai(&self, player_id: i32) -> bool;

    fn player_is_host(&self, player_id: i32) -> bool;

    /// 当前AI的帝国编号
    fn empire_id(&self) -> i32;

    /// 玩家控制的帝国；无则为 [`ALL_EMPIRES`]
    fn player_empire_id(&self, player_id: i32) -> i32;

    fn all_empire_ids(&self) -> Vec<i32>;

    fn empire(&self, empire_id: i32) -> Option<&Empire>;

    fn universe(&self) -> &Universe;

    fn rules(&self) -> &RuleTables;

    fn current_turn(&self) -> i32;

    /// 以下命令返回 1 表示接受，0 表示拒绝
    fn issue_fleet_move_order(&mut self, fleet_id: i32, destination_id: i32) -> i32;

    fn issue_rename_order(&mut self, object_id: i32, new_name: &str) -> i32;

    fn issue_new_fleet_order(&mut self, fleet_name: &str, ship_id: i32) -> i32;

    fn issue_fleet_colonize_order(&mut self, ship_id: i32, planet_id: i32) -> i32;

    fn send_chat_message(&mut self, recipient_player_id: i32, message: &str);

    /// 通知引擎本回合的命令已下达完毕
    fn done_turn(&mut self);

    fn log_output(&mut self, text: &str);
}
