//! 物理世界管理器
//!
//! 使用 Rapier3D 管理挂件的刚体和碰撞体。绳子不是 Rapier 关节，
//! 绳长约束由 [`crate::tether::ConstraintSolver`] 在每个固定步之后手动施加。
//!
//! ## 时间步
//! - 固定步长 1 / physics_fps，时间累积器，每帧最多 max_substep_count 步
//! - 超出上限的时间直接丢弃，不会合成一个大步
//! - 暂停期间不积分；恢复后的第一帧、以及超过 max_frame_gap 的长帧只走一步

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::tether::TetherOptions;

use super::config::get_config;
use super::rapier_body::{build_collider, build_rigid_body, rapier_to_vec3, RapierBody};

/// 物理世界管理器
pub struct TetherWorld {
    /// 物理流水线
    pub physics_pipeline: PhysicsPipeline,
    /// 积分参数
    pub integration_parameters: IntegrationParameters,
    /// 岛管理器
    pub island_manager: IslandManager,
    /// 宽相检测
    pub broad_phase: DefaultBroadPhase,
    /// 窄相检测
    pub narrow_phase: NarrowPhase,
    /// 刚体集合
    pub rigid_body_set: RigidBodySet,
    /// 碰撞体集合
    pub collider_set: ColliderSet,
    /// 关节集合（挂件之间没有关节，流水线需要）
    pub impulse_joint_set: ImpulseJointSet,
    /// 多体关节集合
    pub multibody_joint_set: MultibodyJointSet,
    /// CCD 求解器
    pub ccd_solver: CCDSolver,
    /// 重力向量
    pub gravity: Vector<Real>,
    /// FPS（用于计算固定时间步长）
    pub fps: f32,
    /// 每帧最大子步数
    pub max_substep_count: u32,
    /// 看门狗阈值（秒）
    pub max_frame_gap: f32,
    /// 未消化的时间
    accumulator: f32,
    paused: bool,
    /// 刚从暂停恢复
    resume_pending: bool,
    /// 累计走过的固定步数
    step_count: u64,
}

impl TetherWorld {
    /// 创建新的物理世界
    pub fn new() -> Self {
        let config = get_config();

        let integration_parameters = IntegrationParameters {
            dt: config.fixed_dt(),
            ..IntegrationParameters::default()
        };

        if config.debug_log {
            log::info!(
                "[物理配置] FPS={}, 重力Y={}, 最大子步={}, 看门狗={}s",
                config.physics_fps, config.gravity_y, config.max_substep_count, config.max_frame_gap
            );
        }

        Self {
            physics_pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: vector![0.0, config.gravity_y, 0.0],
            fps: config.physics_fps.max(1.0),
            max_substep_count: config.max_substep_count.max(1),
            max_frame_gap: config.max_frame_gap,
            accumulator: 0.0,
            paused: false,
            resume_pending: false,
            step_count: 0,
        }
    }

    /// 固定时间步长
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.fps
    }

    /// 添加挂件刚体（球形碰撞体）
    pub fn add_body(&mut self, options: &TetherOptions, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let rb_handle = self.rigid_body_set.insert(build_rigid_body(options, position, rotation));
        self.collider_set.insert_with_parent(
            build_collider(options),
            rb_handle,
            &mut self.rigid_body_set,
        );
        rb_handle
    }

    /// 移除刚体及其碰撞体
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// 借出刚体，句柄无效时返回 `None`
    pub fn body_mut(&mut self, handle: Option<RigidBodyHandle>) -> Option<RapierBody<'_>> {
        let rb = self.rigid_body_set.get_mut(handle?)?;
        Some(RapierBody::new(rb))
    }

    /// 只读取刚体位置
    pub fn body_translation(&self, handle: Option<RigidBodyHandle>) -> Option<Vec3> {
        let rb = self.rigid_body_set.get(handle?)?;
        Some(rapier_to_vec3(rb.translation()))
    }

    pub fn rigid_body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    // ========== 暂停/恢复 ==========

    /// 暂停（外部看门狗调用，比如页面切到后台）
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            if get_config().debug_log {
                log::debug!("[物理] 暂停");
            }
        }
    }

    /// 恢复；下一帧只走一个固定步
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.resume_pending = true;
            self.accumulator = 0.0;
            if get_config().debug_log {
                log::debug!("[物理] 恢复");
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// 计算本帧要走几个固定步
    ///
    /// # 参数
    /// - `delta_time`: 距上一帧的墙钟时间（秒）
    pub fn plan_steps(&mut self, delta_time: f32) -> u32 {
        if self.paused || !delta_time.is_finite() || delta_time <= 0.0 {
            return 0;
        }

        if self.resume_pending || delta_time > self.max_frame_gap {
            if !self.resume_pending && get_config().debug_log {
                log::debug!("[物理] 长帧 {:.3}s，丢弃积压时间", delta_time);
            }
            self.resume_pending = false;
            self.accumulator = 0.0;
            return 1;
        }

        let fixed_dt = self.fixed_dt();
        self.accumulator += delta_time;
        let needed_steps = (self.accumulator / fixed_dt).floor() as u32;
        if needed_steps > self.max_substep_count {
            // 帧率过低，超出部分丢弃
            self.accumulator = 0.0;
            return self.max_substep_count;
        }
        self.accumulator -= needed_steps as f32 * fixed_dt;
        needed_steps
    }

    /// 执行一次固定步进
    pub fn step_once(&mut self) {
        self.integration_parameters.dt = self.fixed_dt();
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.step_count += 1;
    }

    /// 限制动态刚体速度，防止物理爆炸
    pub fn clamp_velocities(&mut self) {
        let config = get_config();
        let max_linear_velocity = config.max_linear_velocity;
        let max_angular_velocity = config.max_angular_velocity;

        for (_, rb) in self.rigid_body_set.iter_mut() {
            if !rb.is_dynamic() {
                continue;
            }

            // 限制线速度
            let linvel = *rb.linvel();
            let linvel_mag = linvel.norm();
            if linvel_mag > max_linear_velocity {
                let scale = max_linear_velocity / linvel_mag;
                rb.set_linvel(linvel * scale, true);
            }

            // 限制角速度
            let angvel = *rb.angvel();
            let angvel_mag = angvel.norm();
            if angvel_mag > max_angular_velocity {
                let scale = max_angular_velocity / angvel_mag;
                rb.set_angvel(angvel * scale, true);
            }
        }
    }
}

impl Default for TetherWorld {
    fn default() -> Self {
        Self::new()
    }
}
