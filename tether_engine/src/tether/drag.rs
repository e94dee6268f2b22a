//! 拖拽会话
//!
//! 只在指针按住挂件期间存在，抬起即销毁。

use glam::Vec3;

use crate::input::{Plane, Ray};

use super::constraint::clamp_to_tether;

/// 速度历史容量
pub const VELOCITY_HISTORY_LEN: usize = 5;

/// 定长速度历史（环形缓冲，满了丢最旧的）
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityHistory {
    samples: [Vec3; VELOCITY_HISTORY_LEN],
    /// 下一个写入位置
    head: usize,
    len: usize,
}

impl VelocityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, velocity: Vec3) {
        self.samples[self.head] = velocity;
        self.head = (self.head + 1) % VELOCITY_HISTORY_LEN;
        self.len = (self.len + 1).min(VELOCITY_HISTORY_LEN);
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 从旧到新遍历
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        let start = (self.head + VELOCITY_HISTORY_LEN - self.len) % VELOCITY_HISTORY_LEN;
        (0..self.len).map(move |i| self.samples[(start + i) % VELOCITY_HISTORY_LEN])
    }

    /// 平均速度，空历史为零向量
    pub fn mean(&self) -> Vec3 {
        if self.len == 0 {
            return Vec3::ZERO;
        }
        self.iter().sum::<Vec3>() / self.len as f32
    }
}

/// 拖拽会话
#[derive(Debug, Clone)]
pub struct DragSession {
    pub pointer_id: u32,
    /// 过按下时刚体位置、朝向相机的平面，拖拽期间固定
    pub plane: Plane,
    /// 刚体位置 - 按下时的交点
    pub offset: Vec3,
    /// 上一次写入的运动学位置
    pub last_position: Vec3,
    pub history: VelocityHistory,
}

impl DragSession {
    /// 开始拖拽；射线与拖拽平面不相交时返回 `None`
    pub fn begin(pointer_id: u32, body_position: Vec3, view_direction: Vec3, ray: &Ray) -> Option<Self> {
        let plane = Plane::new(body_position, -view_direction)?;
        let hit = ray.intersect_plane(&plane)?;
        Some(Self {
            pointer_id,
            plane,
            offset: body_position - hit,
            last_position: body_position,
            history: VelocityHistory::new(),
        })
    }

    /// 指针移动：算出下一帧的运动学目标位置并记录速度
    ///
    /// 目标被限制在绳长内（没有反弹，直接控制不存在"冲击"）。
    pub fn track(&mut self, ray: &Ray, anchor: Vec3, string_length: f32, frame_rate: f32) -> Option<Vec3> {
        let hit = ray.intersect_plane(&self.plane)?;
        let raw_target = hit + self.offset;
        let target = clamp_to_tether(anchor, raw_target, string_length).unwrap_or(raw_target);

        self.history.push((target - self.last_position) * frame_rate);
        self.last_position = target;
        Some(target)
    }

    /// 松手速度 = 平均速度 * 衰减
    pub fn release_velocity(&self, damping: f32) -> Vec3 {
        self.history.mean() * damping
    }
}
