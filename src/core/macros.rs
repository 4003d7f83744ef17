//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use orion_ai_host::impl_default;
///
/// struct MyStruct {
///     field1: u32,
///     field2: String,
/// }
///
/// impl_default!(MyStruct {
///     field1: 0,
///     field2: String::new(),
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 定义对脚本可见的值枚举
///
/// 生成带显式判别值的 `#[repr(i32)]` 枚举，并实现
/// [`ScriptEnum`](crate::universe::ScriptEnum)，脚本侧以整数表示枚举值。
///
/// 使用示例:
/// ```rust
/// use orion_ai_host::script_enum;
/// use orion_ai_host::universe::ScriptEnum;
///
/// script_enum! {
///     /// 颜色
///     pub enum Color {
///         Red = 0,
///         Green = 1,
///     }
/// }
///
/// assert_eq!(Color::from_script(1), Some(Color::Green));
/// assert_eq!(Color::Red.to_script(), 0);
/// ```
#[macro_export]
macro_rules! script_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[repr(i32)]
        $vis enum $name {
            $($variant = $value),+
        }

        impl $crate::universe::ScriptEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VALUES: &'static [(&'static str, Self)] = &[
                $((stringify!($variant), $name::$variant)),+
            ];

            fn to_script(self) -> i32 {
                self as i32
            }
        }
    };
}
