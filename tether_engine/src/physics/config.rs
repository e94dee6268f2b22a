//! 物理世界配置
//!
//! 世界级参数扁平化放在一个全局实例里，运行时可随时替换。
//! 每个挂件自己的参数见 [`crate::tether::TetherOptions`]。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 物理世界配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    // ========== 重力 ==========
    /// 重力 Y 分量（负数向下），默认 -9.81
    pub gravity_y: f32,

    // ========== 模拟参数 ==========
    /// 物理 FPS，默认 60.0
    pub physics_fps: f32,
    /// 每帧最大子步数，默认 4
    pub max_substep_count: u32,
    /// 看门狗阈值（秒），默认 0.25
    /// 单帧间隔超过此值视为卡顿/后台切换，只积分一个固定步
    pub max_frame_gap: f32,

    // ========== 速度限制 ==========
    /// 最大线速度，默认 25.0
    pub max_linear_velocity: f32,
    /// 最大角速度（弧度/秒），默认 30.0
    pub max_angular_velocity: f32,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            // ====== 重力 ======
            gravity_y: -9.81,

            // ====== 模拟参数 ======
            // 固定步长 = 1 / physics_fps
            // 约束里的恢复力按 60Hz 名义步长缩放
            physics_fps: 60.0,

            // 帧率低于 physics_fps 时最多补几步
            // 超出部分直接丢弃，不会攒成一个大步
            max_substep_count: 4,

            // 浏览器切后台、断点调试等造成的长间隔
            max_frame_gap: 0.25,

            // ====== 速度限制（防止爆炸）======
            // 拖拽甩出时速度可能很大，上限要留够
            max_linear_velocity: 25.0,
            max_angular_velocity: 30.0,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

impl PhysicsConfig {
    /// 固定时间步长（秒）
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.physics_fps.max(1.0)
    }
}

/// 全局配置实例
static PHYSICS_CONFIG: Lazy<RwLock<PhysicsConfig>> = Lazy::new(|| {
    RwLock::new(PhysicsConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> PhysicsConfig {
    PHYSICS_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: PhysicsConfig) {
    *PHYSICS_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(PhysicsConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dt_from_fps() {
        let config = PhysicsConfig::default();
        assert!((config.fixed_dt() - 1.0 / 60.0).abs() < 1e-6);

        let broken = PhysicsConfig { physics_fps: 0.0, ..PhysicsConfig::default() };
        assert!(broken.fixed_dt().is_finite());
    }
}
