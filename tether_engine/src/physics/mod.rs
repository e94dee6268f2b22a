//! 物理系统模块
//!
//! 使用 Rapier3D 物理引擎实现刚体积分和碰撞。
//!
//! ## 职责划分
//! | 本模块 | tether 模块 |
//! |--------|-------------|
//! | 重力积分、碰撞、阻尼 | 绳长硬约束、回复力、姿态扭矩 |
//! | 固定步长、暂停/恢复 | 掉落状态机、拖拽 |
//! | RigidBody + Collider | RigidBodyHandle 能力接口 |

mod rapier_body;
mod tether_world;
pub mod config;

pub use config::{get_config, reset_config, set_config, PhysicsConfig};
pub use rapier_body::{
    build_collider, build_rigid_body, quat_to_rapier, rapier_to_quat, rapier_to_vec3,
    vec3_to_rapier, RapierBody,
};
pub use tether_world::TetherWorld;
