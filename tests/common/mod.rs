//! 集成测试共用的辅助函数

#![allow(dead_code)]

use orion_ai_host::config::AiConfig;
use orion_ai_host::interface::{GameSnapshot, LocalClient, SharedInterface};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

static INTERPRETER_LOCK: Mutex<()> = Mutex::new(());

/// 同一进程内只能有一个存活的解释器
pub fn lock() -> MutexGuard<'static, ()> {
    INTERPRETER_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// 随仓库发布的参考AI
pub fn reference_ai_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("default").join("AI")
}

pub fn client() -> anyhow::Result<Rc<RefCell<LocalClient>>> {
    let snapshot = GameSnapshot::from_json_file(fixture("snapshot.json"))?;
    Ok(Rc::new(RefCell::new(LocalClient::new(snapshot))))
}

pub fn interface(client: &Rc<RefCell<LocalClient>>) -> SharedInterface {
    client.clone()
}

/// 只含 `FreeOrionAI.js` 的临时AI目录
pub fn ai_dir_with(source: &str) -> anyhow::Result<TempDir> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("FreeOrionAI.js"), source)?;
    Ok(dir)
}

pub fn config_for(dir: &Path) -> AiConfig {
    AiConfig::with_ai_dir(dir)
}
