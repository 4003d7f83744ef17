use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 解释器资源限制
///
/// 取值为0表示使用解释器默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeLimits {
    /// 堆内存上限（字节）
    pub memory_limit_bytes: usize,

    /// 调用栈上限（字节）
    pub max_stack_size_bytes: usize,

    /// 触发垃圾回收的分配阈值（字节）
    pub gc_threshold_bytes: usize,
}

impl_default!(RuntimeLimits {
    memory_limit_bytes: 0,
    max_stack_size_bytes: 0,
    gc_threshold_bytes: 0,
});

/// 低于该值的内存上限无法容纳绑定表本身
const MIN_MEMORY_LIMIT: usize = 1024 * 1024;

impl RuntimeLimits {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.memory_limit_bytes != 0 && self.memory_limit_bytes < MIN_MEMORY_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "memory_limit_bytes must be 0 or at least {}",
                MIN_MEMORY_LIMIT
            )));
        }
        if self.max_stack_size_bytes != 0 && self.max_stack_size_bytes < 64 * 1024 {
            return Err(ConfigError::ValidationError(
                "max_stack_size_bytes must be 0 or at least 65536".to_string(),
            ));
        }
        Ok(())
    }
}
