// ============================================================================
// AI 控制器
// ============================================================================
//
// 构造时依次执行启动步骤，每一步失败只记录日志并跳过依赖它的后续步骤，
// 构造本身不会失败。每回合调用脚本的回合入口，失败时由宿主代为结束回合。

use crate::bindings::js::{self, Bindings};
use crate::bindings::{BindingContext, BindingManifest, TurnSignal};
use crate::config::AiConfig;
use crate::core::{AiError, AiResult};
use crate::interface::SharedInterface;
use crate::scripting::interpreter::Interpreter;
use crate::scripting::modules::{ModuleLoader, ModuleSearchPath};
use rquickjs::{CatchResultExt, Function, Object};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// 控制器生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    /// 正在执行回合入口
    Running,
    Stopped,
}

/// 一次回合推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// 回合入口正常返回
    Completed,
    /// 回合入口失败，宿主代为发出了结束回合信号
    FallbackSignalled,
    /// 回合入口失败，但脚本在失败前已结束回合
    FailedAfterSignal,
}

/// 启动各步骤的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub interpreter: bool,
    /// 接口对象与 `require` 已安装
    pub namespace: bool,
    pub search_path: Vec<PathBuf>,
    pub module: bool,
    pub initialized: bool,
    pub errors: Vec<String>,
}

impl StartupReport {
    /// 所有步骤均成功
    pub fn is_functional(&self) -> bool {
        self.interpreter
            && self.namespace
            && !self.search_path.is_empty()
            && self.module
            && self.initialized
    }

    fn record(&mut self, step: &str, err: &AiError) {
        tracing::error!(target: "ai", "AI startup step '{}' failed: {}", step, err);
        self.errors.push(format!("{}: {}", step, err));
    }

    fn skip(&mut self, step: &str) {
        tracing::warn!(target: "ai", "Skipping AI startup step '{}'", step);
    }
}

/// 脚本AI的生命周期控制器
pub struct AiController {
    config: AiConfig,
    interface: SharedInterface,
    turn: TurnSignal,
    report: StartupReport,
    state: LifecycleState,
    interpreter: Option<Interpreter>,
}

impl AiController {
    /// 创建控制器并执行全部启动步骤
    ///
    /// 任何步骤失败都只会记录日志，控制器进入降级状态：回合推进仍会通过
    /// 宿主的结束回合信号完成。
    pub fn new(config: AiConfig, interface: SharedInterface) -> Self {
        let mut controller = Self {
            config,
            interface,
            turn: TurnSignal::new(),
            report: StartupReport::default(),
            state: LifecycleState::Uninitialized,
            interpreter: None,
        };
        controller.start();
        controller.state = LifecycleState::Ready;

        if controller.report.is_functional() {
            tracing::info!(target: "ai", "AI '{}' is ready", controller.config.module_name);
        } else {
            tracing::warn!(
                target: "ai",
                "AI '{}' started degraded: {}",
                controller.config.module_name,
                controller.report.errors.join("; ")
            );
        }
        controller
    }

    /// 创建控制器，任何启动步骤失败都返回 [`AiError::Degraded`]
    pub fn try_new(config: AiConfig, interface: SharedInterface) -> AiResult<Self> {
        let controller = Self::new(config, interface);
        if controller.report.is_functional() {
            Ok(controller)
        } else {
            Err(AiError::Degraded(controller.report.errors.join("; ")))
        }
    }

    // ========================================================================
    // 启动
    // ========================================================================

    fn start(&mut self) {
        let interpreter = match Interpreter::start(&self.config.runtime) {
            Ok(interpreter) => interpreter,
            Err(err) => {
                self.report.record("interpreter", &err);
                return;
            }
        };
        self.report.interpreter = true;

        let search_path = Rc::new(RefCell::new(ModuleSearchPath::new()));
        let loader = ModuleLoader::new(search_path.clone())
            .with_builtins([self.config.interface_module.clone()]);

        match self.install_namespace(&interpreter, &loader) {
            Ok(()) => self.report.namespace = true,
            Err(err) => self.report.record("namespace", &err),
        }

        // 可变借用须在读取目录前释放
        let configured = self.configure_search_path(&mut search_path.borrow_mut());
        match configured {
            Ok(()) => self.report.search_path = search_path.borrow().dirs().to_vec(),
            Err(err) => self.report.record("search path", &err),
        }

        if self.report.namespace && !self.report.search_path.is_empty() {
            let module_name = self.config.module_name.as_str();
            match interpreter.with(|ctx| loader.import(&ctx, module_name).map(|_| ())) {
                Ok(()) => self.report.module = true,
                Err(err) => self.report.record("import", &err),
            }
        } else {
            self.report.skip("import");
        }

        if self.report.module {
            match call_entry(&interpreter, &self.config.module_name, &self.config.init_entry) {
                Ok(()) => self.report.initialized = true,
                Err(err) => self.report.record("init", &err),
            }
        } else {
            self.report.skip("init");
        }

        self.interpreter = Some(interpreter);
    }

    fn install_namespace(&self, interpreter: &Interpreter, loader: &ModuleLoader) -> AiResult<()> {
        let manifest = BindingManifest::standard();
        manifest.validate()?;
        let bindings = Bindings::new(
            Rc::new(manifest),
            BindingContext::new(self.interface.clone(), self.turn.clone()),
        );
        let interface_module = self.config.interface_module.as_str();
        interpreter
            .with(|ctx| {
                js::install(&ctx, &bindings, interface_module)?;
                loader.install(&ctx)
            })
            .map_err(|err| AiError::Interpreter(err.to_string()))
    }

    /// AI 目录必须可用；额外目录不可用时只记录警告
    fn configure_search_path(&self, search_path: &mut ModuleSearchPath) -> AiResult<()> {
        search_path.append(&self.config.ai_dir)?;
        for dir in &self.config.extra_search_paths {
            if let Err(err) = search_path.append(dir) {
                tracing::warn!(target: "ai", "Ignoring search path entry: {}", err);
            }
        }
        Ok(())
    }

    // ========================================================================
    // 回合
    // ========================================================================

    /// 推进一个回合
    ///
    /// 回合入口失败时记录错误，若脚本尚未结束回合则由宿主发出结束回合信号。
    /// 每次推进最多向引擎报告一次完成。
    pub fn generate_orders(&mut self) -> TurnOutcome {
        self.turn.begin_turn();
        self.state = LifecycleState::Running;

        let result = match &self.interpreter {
            Some(interpreter) if self.report.module => {
                call_entry(interpreter, &self.config.module_name, &self.config.turn_entry)
            }
            _ => Err(AiError::Degraded(format!(
                "module '{}' is not loaded",
                self.config.module_name
            ))),
        };

        let outcome = match result {
            Ok(()) => {
                if !self.turn.is_done() {
                    tracing::debug!(target: "ai", "{} returned without calling DoneTurn", self.config.turn_entry);
                }
                TurnOutcome::Completed
            }
            Err(err) => {
                tracing::error!(target: "ai", "{}", err);
                if self.turn.fire(&self.interface) {
                    tracing::warn!(target: "ai", "Turn ended by the host after the AI failed");
                    TurnOutcome::FallbackSignalled
                } else {
                    TurnOutcome::FailedAfterSignal
                }
            }
        };

        self.state = LifecycleState::Ready;
        outcome
    }

    /// 收到聊天消息；脚本AI目前不处理聊天
    pub fn handle_chat_message(&mut self, sender_id: i32, text: &str) {
        tracing::debug!(target: "ai", "Chat from player {}: {}", sender_id, text);
    }

    pub fn startup_report(&self) -> &StartupReport {
        &self.report
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 停止解释器
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for AiController {
    fn drop(&mut self) {
        self.state = LifecycleState::Stopped;
        if let Some(interpreter) = self.interpreter.take() {
            interpreter.collect_garbage();
        }
        tracing::info!(target: "ai", "AI '{}' stopped", self.config.module_name);
    }
}

/// 调用 `<module>.<entry>()`
fn call_entry(interpreter: &Interpreter, module: &str, entry: &str) -> AiResult<()> {
    let entry_error = |reason: String| AiError::EntryPoint {
        name: format!("{}.{}", module, entry),
        reason,
    };
    interpreter.with(|ctx| {
        let exports: Object = ctx
            .globals()
            .get(module)
            .map_err(|err| entry_error(err.to_string()))?;
        let function: Function = exports
            .get::<_, Option<Function>>(entry)
            .map_err(|err| entry_error(err.to_string()))?
            .ok_or_else(|| entry_error("not defined".to_string()))?;
        function
            .call::<_, ()>(())
            .catch(&ctx)
            .map_err(|err| entry_error(err.to_string()))
    })
}
