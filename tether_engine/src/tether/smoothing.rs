//! 视觉平滑
//!
//! 渲染用的位姿与物理位姿分开存放，每帧向物理位姿靠拢一次，
//! 绳长硬约束造成的瞬移不会直接显示出来。

use glam::{Quat, Vec3};

use super::options::TetherOptions;

/// 渲染位姿
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub position: Vec3,
    pub rotation: Quat,
}

impl VisualState {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// 局部点转世界坐标
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// 平滑器
#[derive(Debug, Clone)]
pub struct VisualSmoother {
    pub fast_factor: f32,
    pub slow_factor: f32,
    /// 释放后多久算"稳定"（秒）
    pub settle_time: f32,
    /// 自释放以来的时间，未释放为 `None`
    since_release: Option<f32>,
}

impl VisualSmoother {
    pub fn new(options: &TetherOptions) -> Self {
        Self {
            fast_factor: options.smoothing_fast,
            slow_factor: options.smoothing_slow,
            settle_time: options.settle_time,
            since_release: None,
        }
    }

    /// 开始计时（挂件被释放时调用）
    pub fn mark_released(&mut self) {
        self.since_release = Some(0.0);
    }

    pub fn advance(&mut self, dt: f32) {
        if let Some(elapsed) = self.since_release.as_mut() {
            *elapsed += dt.max(0.0);
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.since_release, Some(elapsed) if elapsed >= self.settle_time)
    }

    /// 当前跟随系数
    pub fn blend_factor(&self) -> f32 {
        if self.is_settled() {
            self.slow_factor
        } else {
            self.fast_factor
        }
    }

    /// 渲染位姿向物理位姿靠拢一步
    pub fn blend(&self, visual: &mut VisualState, position: Vec3, rotation: Quat) {
        let factor = self.blend_factor();
        if position.is_finite() {
            visual.position = visual.position.lerp(position, factor);
        }
        if rotation.is_finite() {
            visual.rotation = visual.rotation.slerp(rotation, factor).normalize();
        }
    }
}
