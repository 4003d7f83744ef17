//! 单元测试共用的夹具

use crate::interface::{GameSnapshot, LocalClient, SharedInterface};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

const SAMPLE_UNIVERSE: &str = include_str!("../default/universe.json");

static INTERPRETER_LOCK: Mutex<()> = Mutex::new(());

pub fn sample_snapshot() -> GameSnapshot {
    GameSnapshot::from_json_str(SAMPLE_UNIVERSE).expect("sample universe parses")
}

pub fn sample_client() -> Rc<RefCell<LocalClient>> {
    Rc::new(RefCell::new(LocalClient::new(sample_snapshot())))
}

pub fn shared(client: &Rc<RefCell<LocalClient>>) -> SharedInterface {
    client.clone()
}

/// 解释器是进程内单例，启动解释器的测试需串行执行
pub fn interpreter_lock() -> MutexGuard<'static, ()> {
    INTERPRETER_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
