//! 测试用刚体替身：显式欧拉积分，只有重力，没有碰撞

use glam::{Quat, Vec3};

use crate::tether::{BodyMode, RigidBodyHandle};

#[derive(Debug, Clone)]
pub struct MockBody {
    pub translation: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub mode: BodyMode,
    pub kinematic_target: Option<Vec3>,
}

impl MockBody {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            mode: BodyMode::Dynamic,
            kinematic_target: None,
        }
    }

    /// 模拟物理引擎的一步
    pub fn integrate(&mut self, gravity: Vec3, dt: f32) {
        match self.mode {
            BodyMode::Dynamic => {
                self.linvel += gravity * dt;
                self.translation += self.linvel * dt;
                let spin = self.angvel * dt;
                if spin.length_squared() > 0.0 {
                    self.rotation = (Quat::from_scaled_axis(spin) * self.rotation).normalize();
                }
            }
            BodyMode::Kinematic => {
                if let Some(target) = self.kinematic_target.take() {
                    self.translation = target;
                }
            }
        }
    }
}

impl RigidBodyHandle for MockBody {
    fn translation(&self) -> Vec3 {
        self.translation
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linvel
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linvel = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angvel
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angvel = velocity;
    }

    fn mode(&self) -> BodyMode {
        self.mode
    }

    fn set_mode(&mut self, mode: BodyMode) {
        self.mode = mode;
    }

    fn set_next_kinematic_translation(&mut self, translation: Vec3) {
        self.kinematic_target = Some(translation);
    }
}
