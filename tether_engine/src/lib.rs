//! Tether Engine - 锚点吊挂物理核心
//!
//! 一个锚点下用绳子挂两个刚体：
//! - 固定 → 掉落 → 自由模拟 ⇄ 拖拽 的状态机
//! - 绳长硬约束（带反弹）、回复力、姿态扭矩
//! - 拖拽平面、速度历史、松手甩出
//! - 渲染位姿平滑
//! - 五点绳子曲线 + 管道网格
//!
//! 刚体积分和碰撞交给 Rapier3D，其余逻辑只依赖 [`tether::RigidBodyHandle`]。

pub mod input;
pub mod physics;
pub mod rig;
pub mod rope;
pub mod tether;

#[cfg(test)]
mod testing;

pub use input::{PerspectiveCamera, PointerEvent, PointerSource, Ray, SceneCamera};
pub use physics::{PhysicsConfig, TetherWorld};
pub use rig::{TetherRig, TetheredObject};
pub use rope::{AttachSide, RopeCurve, RopeRenderer, TubeMesh};
pub use tether::{DraggableBody, RigidBodyHandle, TetherOptions, TetherPhase, VisualState};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TetherError {
    #[error("Invalid option {name}: {value}")]
    InvalidOption { name: &'static str, value: f32 },

    #[error("Unknown object index: {0}")]
    UnknownObject(usize),
}

pub type Result<T> = std::result::Result<T, TetherError>;
