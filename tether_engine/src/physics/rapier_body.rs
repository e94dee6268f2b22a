//! Rapier 刚体封装
//!
//! 把 Rapier 的 RigidBody 适配成 [`crate::tether::RigidBodyHandle`]，
//! 约束求解和拖拽不直接接触 Rapier 类型。

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

use crate::tether::{BodyMode, TetherOptions};

/// 借用中的 Rapier 刚体
pub struct RapierBody<'a> {
    body: &'a mut RigidBody,
}

impl<'a> RapierBody<'a> {
    pub fn new(body: &'a mut RigidBody) -> Self {
        Self { body }
    }
}

impl crate::tether::RigidBodyHandle for RapierBody<'_> {
    fn translation(&self) -> Vec3 {
        rapier_to_vec3(self.body.translation())
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.body.set_translation(vec3_to_rapier(translation), true);
    }

    fn rotation(&self) -> Quat {
        rapier_to_quat(self.body.rotation())
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.body.set_rotation(quat_to_rapier(rotation), true);
    }

    fn linear_velocity(&self) -> Vec3 {
        rapier_to_vec3(self.body.linvel())
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.body.set_linvel(vec3_to_rapier(velocity), true);
    }

    fn angular_velocity(&self) -> Vec3 {
        rapier_to_vec3(self.body.angvel())
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.body.set_angvel(vec3_to_rapier(velocity), true);
    }

    fn mode(&self) -> BodyMode {
        if self.body.is_kinematic() {
            BodyMode::Kinematic
        } else {
            BodyMode::Dynamic
        }
    }

    fn set_mode(&mut self, mode: BodyMode) {
        match mode {
            BodyMode::Kinematic => {
                // 先清零速度，原地等待第一个拖拽目标
                self.body.set_linvel(Vector::zeros(), false);
                self.body.set_angvel(Vector::zeros(), false);
                self.body.set_body_type(RigidBodyType::KinematicPositionBased, true);
                let current = *self.body.position();
                self.body.set_next_kinematic_position(current);
            }
            BodyMode::Dynamic => {
                self.body.set_body_type(RigidBodyType::Dynamic, true);
            }
        }
    }

    fn set_next_kinematic_translation(&mut self, translation: Vec3) {
        self.body.set_next_kinematic_translation(vec3_to_rapier(translation));
    }
}

/// 按挂件参数创建 Rapier 刚体
pub fn build_rigid_body(options: &TetherOptions, position: Vec3, rotation: Quat) -> RigidBody {
    let pose = Isometry::from_parts(vec3_to_rapier(position).into(), quat_to_rapier(rotation));
    RigidBodyBuilder::dynamic()
        .position(pose)
        .linear_damping(options.linear_damping)
        .angular_damping(options.angular_damping)
        .ccd_enabled(true) // 甩出去的速度可能很大
        .can_sleep(false) // 挂件一直在晃，不休眠
        .build()
}

/// 按挂件参数创建球形碰撞体
pub fn build_collider(options: &TetherOptions) -> Collider {
    ColliderBuilder::ball(options.collider_radius)
        .mass(options.mass)
        .restitution(options.restitution)
        .friction(options.friction)
        .build()
}

/// 将 glam Vec3 转换为 Rapier Vector
pub fn vec3_to_rapier(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

/// 将 Rapier Vector 转换为 glam Vec3
pub fn rapier_to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// 将 glam Quat 转换为 Rapier Rotation
pub fn quat_to_rapier(q: Quat) -> Rotation<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// 将 Rapier Rotation 转换为 glam Quat
pub fn rapier_to_quat(r: &Rotation<Real>) -> Quat {
    // nalgebra 四元数 coords 存储顺序为 (i, j, k, w)
    Quat::from_xyzw(r.coords[0], r.coords[1], r.coords[2], r.coords[3])
}
