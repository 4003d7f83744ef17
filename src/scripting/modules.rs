//! 脚本模块
//!
//! [`ModuleSearchPath`] 按追加顺序查找 `<dir>/<name>.js`，其次 `<dir>/<name>/index.js`。
//! [`ModuleLoader`] 在解释器中安装 CommonJS 风格的 `require`：模块源码包裹在函数中
//! 执行，`module.exports` 按名称缓存。模块在执行前入缓存，因此循环引用能拿到尚未
//! 完成的导出；执行失败时移出缓存，下次 `require` 重新加载。

use crate::core::{AiError, AiResult};
use rquickjs::{CatchResultExt, Ctx, Exception, Function, Object, Value};
use std::cell::RefCell;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// 全局模块缓存对象名
pub const MODULE_CACHE: &str = "__modules";

/// 模块搜索路径
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSearchPath {
    dirs: Vec<PathBuf>,
}

/// 模块名必须是非空的相对路径，且不能跳出搜索目录
pub fn is_valid_module_name(name: &str) -> bool {
    if name.trim().is_empty() || name.contains('\\') {
        return false;
    }
    let path = Path::new(name);
    !path.is_absolute()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

impl ModuleSearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加目录；目录不存在时报错，重复追加被忽略
    pub fn append(&mut self, dir: impl Into<PathBuf>) -> AiResult<()> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(AiError::InvalidSearchPath(dir));
        }
        if self.dirs.contains(&dir) {
            tracing::debug!(target: "scripting", "{} is already on the search path", dir.display());
            return Ok(());
        }
        tracing::debug!(target: "scripting", "Appending {} to the search path", dir.display());
        self.dirs.push(dir);
        Ok(())
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// 按查找顺序列出候选文件
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .flat_map(|dir| {
                [
                    dir.join(format!("{}.js", name)),
                    dir.join(name).join("index.js"),
                ]
            })
            .collect()
    }

    pub fn resolve(&self, name: &str) -> AiResult<PathBuf> {
        if !is_valid_module_name(name) {
            return Err(AiError::ModuleLoad {
                name: name.to_string(),
                reason: "invalid module name".to_string(),
            });
        }
        let candidates = self.candidates(name);
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(AiError::ModuleNotFound {
                name: name.to_string(),
                searched: candidates,
            }),
        }
    }
}

fn wrap_source(source: &str) -> String {
    format!(
        "(function (exports, require, module, __filename) {{\n{}\n}})",
        source
    )
}

/// CommonJS 风格的模块加载器
#[derive(Clone)]
pub struct ModuleLoader {
    search_path: Rc<RefCell<ModuleSearchPath>>,
    builtins: Rc<Vec<String>>,
}

impl ModuleLoader {
    pub fn new(search_path: Rc<RefCell<ModuleSearchPath>>) -> Self {
        Self {
            search_path,
            builtins: Rc::new(Vec::new()),
        }
    }

    /// 内置模块：`require(name)` 直接返回同名全局对象
    pub fn with_builtins(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.builtins = Rc::new(names.into_iter().collect());
        self
    }

    pub fn search_path(&self) -> &Rc<RefCell<ModuleSearchPath>> {
        &self.search_path
    }

    /// 安装全局 `require` 与模块缓存
    pub fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<()> {
        let globals = ctx.globals();
        globals.set(MODULE_CACHE, Object::new(ctx.clone())?)?;
        let loader = self.clone();
        globals.set(
            "require",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, name: String| -> rquickjs::Result<Value<'js>> {
                    loader.require(&ctx, &name)
                },
            )?,
        )?;
        Ok(())
    }

    fn require<'js>(&self, ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Value<'js>> {
        let globals = ctx.globals();
        if self.builtins.iter().any(|builtin| builtin == name) {
            return globals.get(name);
        }

        let cache: Object = globals.get(MODULE_CACHE)?;
        if let Some(module) = cache.get::<_, Option<Object>>(name)? {
            return module.get("exports");
        }

        let path = self
            .search_path
            .borrow()
            .resolve(name)
            .map_err(|err| Exception::throw_message(ctx, &err.to_string()))?;
        let source = fs::read_to_string(&path).map_err(|err| {
            Exception::throw_message(ctx, &format!("Cannot read {}: {}", path.display(), err))
        })?;
        let body: Function = ctx.eval(wrap_source(&source))?;

        let module = Object::new(ctx.clone())?;
        let exports = Object::new(ctx.clone())?;
        module.set("id", name)?;
        module.set("exports", exports.clone())?;
        cache.set(name, module.clone())?;

        tracing::debug!(target: "scripting", "Loading module '{}' from {}", name, path.display());
        let require: Function = globals.get("require")?;
        let filename = path.display().to_string();
        if let Err(err) = body.call::<_, ()>((exports, require, module.clone(), filename)) {
            let _ = cache.remove(name);
            return Err(err);
        }
        module.get("exports")
    }

    /// 导入模块并把导出绑定到同名全局变量
    pub fn import<'js>(&self, ctx: &Ctx<'js>, name: &str) -> AiResult<Value<'js>> {
        if !self.builtins.iter().any(|builtin| builtin == name) {
            self.search_path.borrow().resolve(name)?;
        }
        let globals = ctx.globals();
        let require: Function = globals
            .get("require")
            .map_err(|err| AiError::Interpreter(err.to_string()))?;
        let exports: Value = require
            .call((name,))
            .catch(ctx)
            .map_err(|err| AiError::ModuleLoad {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        globals
            .set(name, exports.clone())
            .map_err(|err| AiError::Interpreter(err.to_string()))?;
        tracing::info!(target: "scripting", "Imported module '{}'", name);
        Ok(exports)
    }
}
