//! 解释器的所有权
//!
//! [`Interpreter`] 独占一个 QuickJS 运行时和上下文。进程内同一时刻最多只有一个
//! 存活的解释器，启动与停止严格成对：启动时置位全局标志，析构时清除。

use crate::config::RuntimeLimits;
use crate::core::{AiError, AiResult};
use rquickjs::{Context, Ctx, Runtime};
use std::sync::atomic::{AtomicBool, Ordering};

static INTERPRETER_LIVE: AtomicBool = AtomicBool::new(false);

/// 存活的脚本解释器
pub struct Interpreter {
    // 上下文必须先于运行时释放
    context: Context,
    runtime: Runtime,
}

impl Interpreter {
    /// 启动解释器并应用资源限制
    ///
    /// 已有存活的解释器时返回 [`AiError::AlreadyRunning`]。
    pub fn start(limits: &RuntimeLimits) -> AiResult<Self> {
        if INTERPRETER_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AiError::AlreadyRunning);
        }

        match Self::create(limits) {
            Ok(interpreter) => {
                tracing::info!(target: "scripting", "Interpreter started");
                Ok(interpreter)
            }
            Err(err) => {
                INTERPRETER_LIVE.store(false, Ordering::Release);
                Err(err)
            }
        }
    }

    fn create(limits: &RuntimeLimits) -> AiResult<Self> {
        let runtime = Runtime::new().map_err(|e| AiError::Interpreter(e.to_string()))?;
        if limits.memory_limit_bytes > 0 {
            runtime.set_memory_limit(limits.memory_limit_bytes);
        }
        if limits.max_stack_size_bytes > 0 {
            runtime.set_max_stack_size(limits.max_stack_size_bytes);
        }
        if limits.gc_threshold_bytes > 0 {
            runtime.set_gc_threshold(limits.gc_threshold_bytes);
        }
        let context = Context::full(&runtime).map_err(|e| AiError::Interpreter(e.to_string()))?;
        Ok(Self { context, runtime })
    }

    /// 当前进程内是否有存活的解释器
    pub fn is_live() -> bool {
        INTERPRETER_LIVE.load(Ordering::Acquire)
    }

    /// 在解释器上下文中执行
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        self.context.with(f)
    }

    pub fn collect_garbage(&self) {
        self.runtime.run_gc();
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        INTERPRETER_LIVE.store(false, Ordering::Release);
        tracing::info!(target: "scripting", "Interpreter stopped");
    }
}
