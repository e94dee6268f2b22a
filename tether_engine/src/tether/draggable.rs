//! 可拖拽挂件
//!
//! 每个挂件一份：状态机、约束求解、拖拽会话、渲染位姿。
//!
//! 状态机：`Pinned → Dropping → Simulated ⇄ Dragging`
//! - `Pinned → Dropping`：掉落延迟到期（或宿主调用 [`DraggableBody::unpin`]）
//! - `Dropping → Simulated`：下坠冲量触发，单向
//! - `Simulated → Dragging`：指针按下
//! - `Dragging → Simulated`：指针抬起，带松手速度

use glam::{Quat, Vec3};

use crate::input::{PointerSource, Ray};
use crate::physics::get_config;
use crate::Result;

use super::body::{BodyMode, RigidBodyHandle};
use super::constraint::ConstraintSolver;
use super::drag::DragSession;
use super::options::TetherOptions;
use super::smoothing::{VisualSmoother, VisualState};
use super::wobble::WobbleSource;

/// 挂件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetherPhase {
    /// 固定在起始位姿，等待掉落
    Pinned,
    /// 自由下落，尚未触发下坠冲量
    Dropping,
    /// 由物理和约束驱动
    Simulated,
    /// 被指针拖拽（运动学）
    Dragging,
}

/// 可拖拽挂件
pub struct DraggableBody {
    pub name: String,
    pub options: TetherOptions,
    pub solver: ConstraintSolver,
    /// 起始位姿（掉落前固定在这里）
    pub start_position: Vec3,
    pub start_rotation: Quat,
    /// 渲染位姿
    pub visual: VisualState,
    phase: TetherPhase,
    /// 下坠冲量是否已触发
    drop_fired: bool,
    /// 固定状态下经过的模拟时间
    pinned_time: f32,
    smoother: VisualSmoother,
    drag: Option<DragSession>,
    wobble: Box<dyn WobbleSource>,
}

impl DraggableBody {
    pub fn new(
        name: impl Into<String>,
        anchor: Vec3,
        start_position: Vec3,
        start_rotation: Quat,
        options: TetherOptions,
        wobble: Box<dyn WobbleSource>,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            name: name.into(),
            solver: ConstraintSolver::new(anchor, &options),
            smoother: VisualSmoother::new(&options),
            options,
            start_position,
            start_rotation,
            // 渲染位姿从起始位姿开始，避免第一帧从原点跳过来
            visual: VisualState::new(start_position, start_rotation),
            phase: TetherPhase::Pinned,
            drop_fired: false,
            pinned_time: 0.0,
            drag: None,
            wobble,
        })
    }

    pub fn phase(&self) -> TetherPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == TetherPhase::Dragging
    }

    pub fn anchor(&self) -> Vec3 {
        self.solver.anchor
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// 解除固定，开始掉落
    pub fn unpin(&mut self) {
        if self.phase != TetherPhase::Pinned {
            return;
        }
        self.phase = TetherPhase::Dropping;
        self.smoother.mark_released();
        if get_config().debug_log {
            log::debug!("[挂件] '{}' 开始掉落", self.name);
        }
    }

    /// 物理步之后调用一次
    ///
    /// 刚体句柄缺失时本帧什么都不做。
    pub fn physics_tick(&mut self, body: Option<&mut dyn RigidBodyHandle>, dt: f32) {
        let Some(body) = body else {
            return;
        };

        match self.phase {
            TetherPhase::Pinned => {
                self.hold_at_start(body);
                self.pinned_time += dt.max(0.0);
                if self.pinned_time >= self.options.drop_delay_secs() {
                    self.unpin();
                }
            }
            TetherPhase::Dropping => {
                self.try_fire_drop(body);
                self.solver.solve(body, self.wobble.as_mut());
            }
            TetherPhase::Simulated => {
                self.solver.solve(body, self.wobble.as_mut());
            }
            TetherPhase::Dragging => {}
        }
    }

    /// 渲染位姿向物理位姿靠拢（每帧一次，物理之后、绳子之前）
    pub fn smooth(&mut self, body: Option<&dyn RigidBodyHandle>, dt: f32) {
        let Some(body) = body else {
            return;
        };
        self.smoother.advance(dt);
        self.smoother.blend(&mut self.visual, body.translation(), body.rotation());
    }

    /// 指针按下挂件
    ///
    /// 只在 `Simulated` 状态下生效，返回是否开始拖拽。
    pub fn pointer_down(
        &mut self,
        body: &mut dyn RigidBodyHandle,
        pointer_id: u32,
        ray: &Ray,
        view_direction: Vec3,
        source: &mut dyn PointerSource,
    ) -> bool {
        if self.phase != TetherPhase::Simulated {
            return false;
        }
        let Some(session) = DragSession::begin(pointer_id, body.translation(), view_direction, ray) else {
            return false;
        };

        body.set_mode(BodyMode::Kinematic);
        source.set_pointer_capture(pointer_id);
        self.drag = Some(session);
        self.phase = TetherPhase::Dragging;
        if get_config().debug_log {
            log::debug!("[拖拽] '{}' 开始拖拽 pointer={}", self.name, pointer_id);
        }
        true
    }

    /// 指针移动，返回本帧写入的运动学目标
    ///
    /// `frame_dt` 是这一帧的时长，拖拽速度按它换算；无效时退回 `drag_frame_rate`。
    pub fn pointer_move(&mut self, body: &mut dyn RigidBodyHandle, ray: &Ray, frame_dt: f32) -> Option<Vec3> {
        let frame_rate = if frame_dt.is_finite() && frame_dt > 0.0 {
            1.0 / frame_dt
        } else {
            self.options.drag_frame_rate
        };
        let session = self.drag.as_mut()?;
        let target = session.track(ray, self.solver.anchor, self.solver.string_length, frame_rate)?;
        body.set_next_kinematic_translation(target);
        Some(target)
    }

    /// 指针抬起，返回松手速度
    pub fn pointer_up(
        &mut self,
        body: &mut dyn RigidBodyHandle,
        pointer_id: u32,
        source: &mut dyn PointerSource,
    ) -> Option<Vec3> {
        if self.drag.as_ref()?.pointer_id != pointer_id {
            return None;
        }
        let session = self.drag.take()?;

        body.set_mode(BodyMode::Dynamic);
        source.release_pointer_capture(pointer_id);

        let velocity = session.release_velocity(self.options.release_damping);
        body.set_linear_velocity(velocity);
        self.phase = TetherPhase::Simulated;
        if get_config().debug_log {
            log::debug!(
                "[拖拽] '{}' 松手 样本={} 速度=({:.2}, {:.2}, {:.2})",
                self.name, session.history.len(), velocity.x, velocity.y, velocity.z
            );
        }
        Some(velocity)
    }

    fn hold_at_start(&self, body: &mut dyn RigidBodyHandle) {
        body.set_translation(self.start_position);
        body.set_rotation(self.start_rotation);
        body.set_linear_velocity(Vec3::ZERO);
        body.set_angular_velocity(Vec3::ZERO);
    }

    /// 低于起始高度一定距离后给一次向下的速度冲量，整个生命周期只触发一次
    fn try_fire_drop(&mut self, body: &mut dyn RigidBodyHandle) {
        if self.drop_fired {
            return;
        }
        let threshold = self.start_position.y - self.options.drop_margin;
        if body.translation().y >= threshold {
            return;
        }
        body.set_linear_velocity(body.linear_velocity() - Vec3::Y * self.options.drop_impulse);
        self.drop_fired = true;
        self.phase = TetherPhase::Simulated;
        if get_config().debug_log {
            log::debug!("[挂件] '{}' 下坠冲量已触发", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NullPointerSource;
    use crate::testing::MockBody;
    use crate::tether::constraint::NOMINAL_DT;
    use crate::tether::wobble::SeededWobble;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    fn make(start: Vec3) -> DraggableBody {
        let options = TetherOptions { drop_delay_ms: 100.0, ..TetherOptions::default() };
        DraggableBody::new(
            "left",
            Vec3::new(0.0, 3.2, 0.0),
            start,
            Quat::IDENTITY,
            options,
            Box::new(SeededWobble::new(1)),
        )
        .unwrap()
    }

    fn step(object: &mut DraggableBody, body: &mut MockBody) {
        body.integrate(GRAVITY, NOMINAL_DT);
        object.physics_tick(Some(&mut *body), NOMINAL_DT);
        object.smooth(Some(&*body), NOMINAL_DT);
    }

    /// 跑到 Simulated 状态
    fn settle(object: &mut DraggableBody, body: &mut MockBody) {
        for _ in 0..240 {
            step(object, body);
        }
        assert_eq!(object.phase(), TetherPhase::Simulated);
    }

    fn ray_at(point: Vec3) -> Ray {
        Ray::new(point + Vec3::Z * 5.0, Vec3::NEG_Z).unwrap()
    }

    #[test]
    fn test_visual_starts_at_drop_pose() {
        let start = Vec3::new(0.4, 2.8, 0.0);
        let object = make(start);
        assert_eq!(object.visual.position, start);
        assert_eq!(object.phase(), TetherPhase::Pinned);
    }

    #[test]
    fn test_pinned_holds_start_pose() {
        let start = Vec3::new(0.4, 2.8, 0.0);
        let mut object = make(start);
        let mut body = MockBody::at(start);
        for _ in 0..3 {
            step(&mut object, &mut body);
            assert_eq!(body.translation, start);
            assert_eq!(body.linvel, Vec3::ZERO);
        }
        assert_eq!(object.phase(), TetherPhase::Pinned);
    }

    #[test]
    fn test_drop_fires_once() {
        let start = Vec3::new(0.4, 2.8, 0.0);
        let mut object = make(start);
        let mut body = MockBody::at(start);

        let mut transitions = 0;
        let mut previous = object.phase();
        for _ in 0..240 {
            step(&mut object, &mut body);
            if previous == TetherPhase::Dropping && object.phase() == TetherPhase::Simulated {
                transitions += 1;
            }
            assert_ne!(
                (previous, object.phase()),
                (TetherPhase::Simulated, TetherPhase::Dropping)
            );
            previous = object.phase();
        }
        assert_eq!(transitions, 1);
        assert!(object.drop_fired);
    }

    #[test]
    fn test_undragged_stays_within_string() {
        let start = Vec3::new(1.2, 2.8, 0.0);
        let mut object = make(start);
        let mut body = MockBody::at(start);
        for _ in 0..600 {
            step(&mut object, &mut body);
            assert!(body.translation.distance(object.anchor()) <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_missing_body_is_noop() {
        let mut object = make(Vec3::new(0.0, 2.8, 0.0));
        object.physics_tick(None, 10.0);
        object.smooth(None, 10.0);
        assert_eq!(object.phase(), TetherPhase::Pinned);
    }

    #[test]
    fn test_pointer_down_ignored_before_simulated() {
        let start = Vec3::new(0.0, 2.8, 0.0);
        let mut object = make(start);
        let mut body = MockBody::at(start);
        let grabbed = object.pointer_down(&mut body, 1, &ray_at(start), Vec3::NEG_Z, &mut NullPointerSource);
        assert!(!grabbed);
        assert_eq!(object.phase(), TetherPhase::Pinned);
        assert_eq!(body.mode, BodyMode::Dynamic);
    }

    #[test]
    fn test_click_without_move_releases_zero_velocity() {
        let mut object = make(Vec3::new(0.0, 2.8, 0.0));
        let mut body = MockBody::at(Vec3::new(0.0, 2.8, 0.0));
        settle(&mut object, &mut body);

        let here = body.translation;
        assert!(object.pointer_down(&mut body, 7, &ray_at(here), Vec3::NEG_Z, &mut NullPointerSource));
        assert_eq!(body.mode, BodyMode::Kinematic);
        assert_eq!(object.phase(), TetherPhase::Dragging);

        let velocity = object.pointer_up(&mut body, 7, &mut NullPointerSource).unwrap();
        assert_eq!(velocity, Vec3::ZERO);
        assert_eq!(body.linvel, Vec3::ZERO);
        assert_eq!(body.mode, BodyMode::Dynamic);
        assert_eq!(object.phase(), TetherPhase::Simulated);
        assert!(object.drag_session().is_none());
    }

    #[test]
    fn test_throw_uses_mean_velocity() {
        let mut object = make(Vec3::new(0.0, 2.8, 0.0));
        let mut body = MockBody::at(Vec3::new(0.0, 2.8, 0.0));
        settle(&mut object, &mut body);
        // 挪到绳长以内，拖拽目标不会被截断
        body.translation = Vec3::new(0.0, 2.0, 0.0);

        let here = body.translation;
        assert!(object.pointer_down(&mut body, 1, &ray_at(here), Vec3::NEG_Z, &mut NullPointerSource));
        // 每帧水平移动 0.01
        for i in 1..=3 {
            let target = object
                .pointer_move(&mut body, &ray_at(here + Vec3::X * 0.01 * i as f32), NOMINAL_DT)
                .unwrap();
            body.integrate(GRAVITY, NOMINAL_DT);
            object.physics_tick(Some(&mut body), NOMINAL_DT);
            assert_eq!(body.translation, target);
        }

        let velocity = object.pointer_up(&mut body, 1, &mut NullPointerSource).unwrap();
        // 0.01 * 60 * 0.5
        assert!((velocity - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(body.linvel, velocity);
    }

    #[test]
    fn test_pointer_up_other_pointer_ignored() {
        let mut object = make(Vec3::new(0.0, 2.8, 0.0));
        let mut body = MockBody::at(Vec3::new(0.0, 2.8, 0.0));
        settle(&mut object, &mut body);

        let here = body.translation;
        assert!(object.pointer_down(&mut body, 1, &ray_at(here), Vec3::NEG_Z, &mut NullPointerSource));
        assert!(object.pointer_up(&mut body, 2, &mut NullPointerSource).is_none());
        assert!(object.is_dragging());
    }

    #[test]
    fn test_throw_speed_follows_frame_time() {
        let mut object = make(Vec3::new(0.0, 2.8, 0.0));
        let mut body = MockBody::at(Vec3::new(0.0, 2.8, 0.0));
        settle(&mut object, &mut body);
        body.translation = Vec3::new(0.0, 2.0, 0.0);

        // 30fps 下每帧移动 0.02，与 60fps 下每帧 0.01 是同一个速度
        let here = body.translation;
        assert!(object.pointer_down(&mut body, 1, &ray_at(here), Vec3::NEG_Z, &mut NullPointerSource));
        for i in 1..=3 {
            object.pointer_move(&mut body, &ray_at(here + Vec3::X * 0.02 * i as f32), 1.0 / 30.0);
        }
        let velocity = object.pointer_up(&mut body, 1, &mut NullPointerSource).unwrap();
        assert!((velocity - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_invalid_frame_time_uses_fallback_rate() {
        let mut object = make(Vec3::new(0.0, 2.8, 0.0));
        let mut body = MockBody::at(Vec3::new(0.0, 2.8, 0.0));
        settle(&mut object, &mut body);
        body.translation = Vec3::new(0.0, 2.0, 0.0);

        let here = body.translation;
        assert!(object.pointer_down(&mut body, 1, &ray_at(here), Vec3::NEG_Z, &mut NullPointerSource));
        object.pointer_move(&mut body, &ray_at(here + Vec3::X * 0.01), 0.0);
        object.pointer_move(&mut body, &ray_at(here + Vec3::X * 0.02), f32::NAN);
        let velocity = object.pointer_up(&mut body, 1, &mut NullPointerSource).unwrap();
        // drag_frame_rate = 60
        assert!((velocity - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-3);
        assert!(velocity.is_finite());
    }
}
