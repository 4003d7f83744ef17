//! 脚本可见的枚举
//!
//! 判别值与引擎定义一致，脚本侧以整数传递。

/// 以整数形式暴露给脚本的枚举
pub trait ScriptEnum: Copy + Sized + 'static {
    /// 脚本可见的类型名
    const NAME: &'static str;
    /// 脚本可见的取值表（名称, 枚举值）
    const VALUES: &'static [(&'static str, Self)];

    fn to_script(self) -> i32;

    fn from_script(value: i32) -> Option<Self> {
        Self::VALUES
            .iter()
            .map(|(_, variant)| *variant)
            .find(|variant| variant.to_script() == value)
    }

    fn script_name(self) -> &'static str {
        Self::VALUES
            .iter()
            .find(|(_, variant)| variant.to_script() == self.to_script())
            .map(|(name, _)| *name)
            .unwrap_or("")
    }
}

script_enum! {
    /// 恒星类型
    pub enum StarType {
        Blue = 0,
        White = 1,
        Yellow = 2,
        Orange = 3,
        Red = 4,
        Neutron = 5,
        BlackHole = 6,
    }
}

script_enum! {
    /// 行星尺寸
    pub enum PlanetSize {
        Tiny = 1,
        Small = 2,
        Medium = 3,
        Large = 4,
        Huge = 5,
        Asteroids = 6,
        GasGiant = 7,
    }
}

script_enum! {
    /// 行星类型
    pub enum PlanetType {
        Swamp = 0,
        Radiated = 1,
        Toxic = 2,
        Inferno = 3,
        Barren = 4,
        Tundra = 5,
        Desert = 6,
        Terran = 7,
        Ocean = 8,
        Asteroids = 9,
        GasGiant = 10,
    }
}

script_enum! {
    /// 行星环境
    pub enum PlanetEnvironment {
        Uninhabitable = 0,
        Hostile = 1,
        Poor = 2,
        Adequate = 3,
        Good = 4,
    }
}

script_enum! {
    /// 科技类型
    pub enum TechType {
        Theory = 0,
        Application = 1,
        Refinement = 2,
    }
}

script_enum! {
    /// 科技研究状态
    pub enum TechStatus {
        Unresearchable = 0,
        Researchable = 1,
        Complete = 2,
    }
}

script_enum! {
    /// 计量器类型
    pub enum MeterType {
        Population = 0,
        Farming = 1,
        Industry = 2,
        Research = 3,
        Trade = 4,
        Mining = 5,
        Construction = 6,
        Health = 7,
    }
}

script_enum! {
    /// 资源中心焦点
    pub enum FocusType {
        Balanced = 1,
        Farming = 2,
        Industry = 3,
        Mining = 4,
        Research = 5,
        Trade = 6,
    }
}

script_enum! {
    /// 建筑被占领时的处理方式
    pub enum CaptureResult {
        Capture = 0,
        Destroy = 1,
        Retain = 2,
        Share = 3,
    }
}
