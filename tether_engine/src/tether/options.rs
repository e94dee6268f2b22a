//! 挂件参数
//!
//! 每个挂件一份，创建后不再修改。

use crate::{Result, TetherError};

/// 挂件参数
#[derive(Debug, Clone)]
pub struct TetherOptions {
    // ========== 绳子 ==========
    /// 绳长：锚点到刚体的最大距离
    pub string_length: f32,
    /// 绳子粗细（管道半径）
    pub string_thickness: f32,
    /// 松弛时中点下垂量 = 松弛长度 * sag_factor
    pub sag_factor: f32,

    // ========== 刚体 ==========
    /// 球形碰撞体半径
    pub collider_radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,

    // ========== 入场掉落 ==========
    /// 固定在起始位姿的时长（毫秒）
    pub drop_delay_ms: f32,
    /// 低于起始高度多少后触发下坠冲量
    pub drop_margin: f32,
    /// 下坠冲量（速度增量）
    pub drop_impulse: f32,

    // ========== 约束 ==========
    /// 绳子拉直时的反弹系数
    pub bounce_factor: f32,
    /// 回复力增益
    pub restoring_gain: f32,
    /// 姿态扭矩增益
    pub torque_gain: f32,
    /// 姿态扭矩整体缩放
    pub torque_scale: f32,
    /// 撞到绳长极限时随机角速度 = 冲击速度 * wobble_scale
    pub wobble_scale: f32,

    // ========== 拖拽 ==========
    /// 松手时速度衰减
    pub release_damping: f32,
    /// 帧间隔无效时，拖拽速度换算用的帧率
    pub drag_frame_rate: f32,

    // ========== 视觉平滑 ==========
    /// 入场阶段的跟随系数
    pub smoothing_fast: f32,
    /// 稳定后的跟随系数
    pub smoothing_slow: f32,
    /// 入场阶段时长（秒）
    pub settle_time: f32,
}

impl Default for TetherOptions {
    fn default() -> Self {
        Self {
            string_length: 2.0,
            string_thickness: 0.02,
            sag_factor: 0.35,

            collider_radius: 0.35,
            mass: 1.0,
            restitution: 0.3,
            friction: 0.5,
            linear_damping: 0.4,
            angular_damping: 0.6,

            drop_delay_ms: 600.0,
            drop_margin: 0.1,
            drop_impulse: 2.0,

            bounce_factor: 0.25,
            restoring_gain: 5.0,
            torque_gain: 1.5,
            torque_scale: 0.08,
            wobble_scale: 0.5,

            release_damping: 0.5,
            drag_frame_rate: 60.0,

            smoothing_fast: 0.5,
            smoothing_slow: 0.08,
            settle_time: 2.0,
        }
    }
}

impl TetherOptions {
    /// 检查参数范围
    pub fn validate(&self) -> Result<()> {
        positive("string_length", self.string_length)?;
        positive("string_thickness", self.string_thickness)?;
        positive("collider_radius", self.collider_radius)?;
        positive("mass", self.mass)?;
        positive("drag_frame_rate", self.drag_frame_rate)?;

        non_negative("sag_factor", self.sag_factor)?;
        non_negative("restitution", self.restitution)?;
        non_negative("friction", self.friction)?;
        non_negative("linear_damping", self.linear_damping)?;
        non_negative("angular_damping", self.angular_damping)?;
        non_negative("drop_delay_ms", self.drop_delay_ms)?;
        non_negative("drop_margin", self.drop_margin)?;
        non_negative("drop_impulse", self.drop_impulse)?;
        non_negative("restoring_gain", self.restoring_gain)?;
        non_negative("torque_gain", self.torque_gain)?;
        non_negative("torque_scale", self.torque_scale)?;
        non_negative("wobble_scale", self.wobble_scale)?;
        non_negative("settle_time", self.settle_time)?;

        unit("bounce_factor", self.bounce_factor)?;
        unit("release_damping", self.release_damping)?;
        unit("smoothing_fast", self.smoothing_fast)?;
        unit("smoothing_slow", self.smoothing_slow)?;
        Ok(())
    }

    /// 掉落延迟（秒）
    pub fn drop_delay_secs(&self) -> f32 {
        self.drop_delay_ms / 1000.0
    }
}

fn positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TetherError::InvalidOption { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TetherError::InvalidOption { name, value })
    }
}

fn unit(name: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TetherError::InvalidOption { name, value })
    }
}
