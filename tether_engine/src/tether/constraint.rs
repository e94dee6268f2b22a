//! 绳长约束求解
//!
//! 绳子不是物理引擎的关节，每个物理步之后在这里手动修正：
//! - 硬约束：超出绳长立即拉回，径向外速度带反弹反向
//! - 回复力：把刚体拉向锚点正下方的自然静止点
//! - 姿态扭矩：让刚体的"重"轴朝下，像单摆一样稳定下来
//!
//! 所有归一化/叉积遇到零向量都跳过本步修正，不产生 NaN。

use glam::{Quat, Vec3};

use super::body::RigidBodyHandle;
use super::options::TetherOptions;
use super::wobble::WobbleSource;

/// 回复力使用的名义步长
pub const NOMINAL_DT: f32 = 1.0 / 60.0;

/// 退化向量判定阈值
const EPSILON: f32 = 1e-6;

/// 硬约束修正结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetherCorrection {
    /// 拉回后的位置
    pub position: Vec3,
    /// 去掉外向径向速度后的速度
    pub velocity: Vec3,
    /// 外向径向速度（冲击速度），未撞到极限为 0
    pub impact_speed: f32,
}

/// 把 `target` 限制在以 `anchor` 为球心、`length` 为半径的球内
///
/// 沿原方向截断。已在范围内或方向退化时返回 `None`。
pub fn clamp_to_tether(anchor: Vec3, target: Vec3, length: f32) -> Option<Vec3> {
    let offset = target - anchor;
    if offset.length() <= length {
        return None;
    }
    let direction = offset.try_normalize()?;
    Some(anchor + direction * length)
}

/// 硬约束：位置立即截断，外向径向速度按反弹系数反向
///
/// `v' = v - dir * radial * (1 + bounce)`，只在 radial > 0 时生效。
pub fn tether_correction(
    anchor: Vec3,
    position: Vec3,
    velocity: Vec3,
    length: f32,
    bounce: f32,
) -> Option<TetherCorrection> {
    let offset = position - anchor;
    if offset.length() <= length {
        return None;
    }
    let direction = offset.try_normalize()?;

    let radial_speed = velocity.dot(direction);
    let (velocity, impact_speed) = if radial_speed > 0.0 {
        (velocity - direction * radial_speed * (1.0 + bounce), radial_speed)
    } else {
        (velocity, 0.0)
    };

    Some(TetherCorrection {
        position: anchor + direction * length,
        velocity,
        impact_speed,
    })
}

/// 自然静止点：锚点正下方绳长处
pub fn rest_point(anchor: Vec3, length: f32) -> Vec3 {
    anchor - Vec3::Y * length
}

/// 回复力产生的速度增量
pub fn restoring_delta(anchor: Vec3, position: Vec3, length: f32, gain: f32) -> Vec3 {
    (rest_point(anchor, length) - position) * gain * NOMINAL_DT
}

/// 姿态扭矩产生的角速度增量
///
/// 角度取 `asin(|local_down × world_down|)`，沿叉积方向。
/// 已对齐（或正好倒置）时叉积退化，返回 `None`。
pub fn orientation_torque(rotation: Quat, heavy_axis: Vec3, gain: f32, scale: f32) -> Option<Vec3> {
    let local_down = rotation * heavy_axis;
    let cross = local_down.cross(Vec3::NEG_Y);
    let magnitude = cross.length();
    if !magnitude.is_finite() || magnitude < EPSILON {
        return None;
    }
    let axis = cross / magnitude;
    let angle = magnitude.clamp(0.0, 1.0).asin();
    Some(axis * angle * gain * scale)
}

/// 单个挂件的约束求解器
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    pub anchor: Vec3,
    pub string_length: f32,
    pub bounce_factor: f32,
    pub restoring_gain: f32,
    pub torque_gain: f32,
    pub torque_scale: f32,
    pub wobble_scale: f32,
    /// 刚体局部空间里的"重"轴
    pub heavy_axis: Vec3,
}

impl ConstraintSolver {
    pub fn new(anchor: Vec3, options: &TetherOptions) -> Self {
        Self {
            anchor,
            string_length: options.string_length,
            bounce_factor: options.bounce_factor,
            restoring_gain: options.restoring_gain,
            torque_gain: options.torque_gain,
            torque_scale: options.torque_scale,
            wobble_scale: options.wobble_scale,
            heavy_axis: Vec3::NEG_Y,
        }
    }

    /// 一个物理步的全部修正（拖拽时不要调用）
    ///
    /// 返回本步的冲击速度，没撞到绳长极限为 0。
    pub fn solve(&self, body: &mut dyn RigidBodyHandle, wobble: &mut dyn WobbleSource) -> f32 {
        let impact_speed = self.apply_tether(body, wobble);
        self.apply_restoring_force(body);
        self.apply_orientation_torque(body);
        impact_speed
    }

    /// 硬约束 + 随机抖动
    pub fn apply_tether(&self, body: &mut dyn RigidBodyHandle, wobble: &mut dyn WobbleSource) -> f32 {
        let Some(correction) = tether_correction(
            self.anchor,
            body.translation(),
            body.linear_velocity(),
            self.string_length,
            self.bounce_factor,
        ) else {
            return 0.0;
        };

        body.set_translation(correction.position);
        body.set_linear_velocity(correction.velocity);

        if correction.impact_speed > 0.0 {
            let kick = wobble.next_wobble() * correction.impact_speed * self.wobble_scale;
            body.set_angular_velocity(body.angular_velocity() + kick);
        }
        correction.impact_speed
    }

    pub fn apply_restoring_force(&self, body: &mut dyn RigidBodyHandle) {
        let delta = restoring_delta(
            self.anchor,
            body.translation(),
            self.string_length,
            self.restoring_gain,
        );
        if delta.is_finite() {
            body.set_linear_velocity(body.linear_velocity() + delta);
        }
    }

    pub fn apply_orientation_torque(&self, body: &mut dyn RigidBodyHandle) {
        if let Some(delta) =
            orientation_torque(body.rotation(), self.heavy_axis, self.torque_gain, self.torque_scale)
        {
            body.set_angular_velocity(body.angular_velocity() + delta);
        }
    }
}
