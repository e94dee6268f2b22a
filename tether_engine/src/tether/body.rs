//! 刚体能力接口
//!
//! 约束求解和拖拽只通过这个 trait 读写刚体，不直接依赖物理引擎。
//! Rapier 的实现见 [`crate::physics::RapierBody`]。

use glam::{Quat, Vec3};

/// 刚体驱动方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// 由物理积分驱动（重力、碰撞）
    Dynamic,
    /// 由显式位姿写入驱动，跳过积分
    Kinematic,
}

/// 刚体句柄
pub trait RigidBodyHandle {
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, translation: Vec3);

    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);

    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);

    fn mode(&self) -> BodyMode;
    fn set_mode(&mut self, mode: BodyMode);

    /// 运动学模式下，下一步要到达的位置
    fn set_next_kinematic_translation(&mut self, translation: Vec3);
}
