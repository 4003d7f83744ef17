//! 原生函数的调用上下文

use crate::interface::{AiInterface, SharedInterface};
use std::cell::Cell;
use std::rc::Rc;

/// 回合完成信号
///
/// 控制器与脚本侧的 `DoneTurn` 共享同一个信号，保证每次回合推进最多向引擎
/// 报告一次完成。
#[derive(Debug, Clone, Default)]
pub struct TurnSignal {
    done: Rc<Cell<bool>>,
}

impl TurnSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新回合开始，清除上一回合的信号
    pub fn begin_turn(&self) {
        self.done.set(false);
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    /// 向引擎发出回合完成信号
    ///
    /// 本回合已发出过时不再转发，返回 `false`。
    pub fn fire(&self, iface: &SharedInterface) -> bool {
        if self.done.get() {
            return false;
        }
        match iface.try_borrow_mut() {
            Ok(mut iface) => {
                iface.done_turn();
                self.done.set(true);
                true
            }
            Err(_) => {
                tracing::error!(target: "bindings", "DoneTurn while the AI interface is busy");
                false
            }
        }
    }
}

/// 绑定函数共享的状态
#[derive(Clone)]
pub struct BindingContext {
    iface: SharedInterface,
    turn: TurnSignal,
}

impl BindingContext {
    pub fn new(iface: SharedInterface, turn: TurnSignal) -> Self {
        Self { iface, turn }
    }

    pub fn interface(&self) -> &SharedInterface {
        &self.iface
    }

    pub fn turn(&self) -> &TurnSignal {
        &self.turn
    }

    /// 只读访问引擎接口，借用在闭包返回时释放
    pub fn read<R>(&self, f: impl FnOnce(&dyn AiInterface) -> R) -> R {
        let iface = self.iface.borrow();
        f(&*iface)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut dyn AiInterface) -> R) -> R {
        let mut iface = self.iface.borrow_mut();
        f(&mut *iface)
    }
}
