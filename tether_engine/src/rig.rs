//! 挂件组装
//!
//! 一个锚点下挂多个挂件，每帧按固定顺序执行：
//! 1. 取走指针事件（按下/抬起按顺序，相邻按键之间的移动只取最后一次）
//! 2. 物理积分，每个固定步之后做约束修正
//! 3. 渲染位姿平滑
//! 4. 按渲染位姿重新生成绳子
//!
//! 顺序不能变，否则绳子会读到过期的挂点。

use glam::{Quat, Vec3};
use rapier3d::prelude::RigidBodyHandle as RapierHandle;

use crate::input::{PointerButton, PointerEvent, PointerInbox, PointerSource, SceneCamera};
use crate::physics::{get_config, TetherWorld};
use crate::rope::{AttachSide, RopeRenderer};
use crate::tether::{
    DraggableBody, RigidBodyHandle, SeededWobble, TetherOptions, TetherPhase, VisualState,
};
use crate::{Result, TetherError};

/// 单个挂件：逻辑 + 刚体句柄 + 绳子
pub struct TetheredObject {
    pub body: DraggableBody,
    pub rope: RopeRenderer,
    handle: Option<RapierHandle>,
}

impl TetheredObject {
    pub fn phase(&self) -> TetherPhase {
        self.body.phase()
    }

    pub fn visual(&self) -> &VisualState {
        &self.body.visual
    }

    pub fn handle(&self) -> Option<RapierHandle> {
        self.handle
    }
}

/// 挂件组
pub struct TetherRig {
    pub anchor: Vec3,
    pub world: TetherWorld,
    objects: Vec<TetheredObject>,
    inbox: PointerInbox,
}

impl TetherRig {
    pub fn new(anchor: Vec3) -> Self {
        Self::with_world(anchor, TetherWorld::new())
    }

    pub fn with_world(anchor: Vec3, world: TetherWorld) -> Self {
        Self {
            anchor,
            world,
            objects: Vec::new(),
            inbox: PointerInbox::new(),
        }
    }

    /// 添加挂件，返回索引
    ///
    /// `seed` 决定绳子拉直时的随机抖动序列。
    pub fn add_object(
        &mut self,
        name: &str,
        start_position: Vec3,
        start_rotation: Quat,
        side: AttachSide,
        options: TetherOptions,
        seed: u64,
    ) -> Result<usize> {
        let rope = RopeRenderer::new(self.anchor, side, &options);
        let body = DraggableBody::new(
            name,
            self.anchor,
            start_position,
            start_rotation,
            options,
            Box::new(SeededWobble::new(seed)),
        )?;
        let handle = self.world.add_body(&body.options, start_position, start_rotation);

        if get_config().debug_log {
            log::info!(
                "[挂件] 添加 '{}': 起始位置=({:.2},{:.2},{:.2}), 绳长={}, 掉落延迟={}ms",
                name,
                start_position.x, start_position.y, start_position.z,
                body.options.string_length, body.options.drop_delay_ms
            );
        }

        let mut object = TetheredObject { body, rope, handle: Some(handle) };
        object.rope.update(self.anchor, &object.body.visual);
        self.objects.push(object);
        Ok(self.objects.len() - 1)
    }

    pub fn objects(&self) -> &[TetheredObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Result<&TetheredObject> {
        self.objects.get(index).ok_or(TetherError::UnknownObject(index))
    }

    pub fn object_mut(&mut self, index: usize) -> Result<&mut TetheredObject> {
        self.objects.get_mut(index).ok_or(TetherError::UnknownObject(index))
    }

    /// 立即解除固定（不等掉落延迟）
    pub fn unpin(&mut self, index: usize) -> Result<()> {
        self.object_mut(index)?.body.unpin();
        Ok(())
    }

    // ========== 指针事件（异步到达，只记录） ==========

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.inbox.pointer_down(event);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.inbox.pointer_move(event);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.inbox.pointer_up(event);
    }

    // ========== 暂停/恢复 ==========

    pub fn pause(&mut self) {
        self.world.pause();
    }

    pub fn resume(&mut self) {
        self.world.resume();
    }

    /// 指针射线命中的最近挂件（只考虑可拖拽的）
    pub fn pick(&self, camera: &dyn SceneCamera, client: glam::Vec2) -> Option<usize> {
        let ray = camera.ray_from_client(client)?;
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.phase() == TetherPhase::Simulated)
            .filter_map(|(index, object)| {
                let center = self.world.body_translation(object.handle)?;
                let distance = ray.intersect_sphere(center, object.body.options.collider_radius)?;
                Some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// 每帧调用一次
    ///
    /// # 参数
    /// - `delta_time`: 距上一帧的墙钟时间（秒）
    pub fn frame(&mut self, delta_time: f32, camera: &dyn SceneCamera, source: &mut dyn PointerSource) {
        // 1. 指针
        self.consume_pointer(delta_time, camera, source);

        // 2. 物理 + 约束
        let steps = self.world.plan_steps(delta_time);
        let fixed_dt = self.world.fixed_dt();
        for _ in 0..steps {
            self.world.step_once();
            for object in &mut self.objects {
                let mut body = self.world.body_mut(object.handle);
                object
                    .body
                    .physics_tick(body.as_mut().map(|b| b as &mut dyn RigidBodyHandle), fixed_dt);
            }
        }
        if steps > 0 {
            self.world.clamp_velocities();
        }

        // 3. 视觉平滑（计时按模拟时间，暂停期间不推进）
        let simulated_time = steps as f32 * fixed_dt;
        for object in &mut self.objects {
            let body = self.world.body_mut(object.handle);
            object
                .body
                .smooth(body.as_ref().map(|b| b as &dyn RigidBodyHandle), simulated_time);
        }

        // 4. 绳子
        for object in &mut self.objects {
            object.rope.update(self.anchor, &object.body.visual);
        }
    }

    /// 按到达顺序处理指针事件
    ///
    /// 每次按键之前先处理它前面的移动；最后一次按键之后的移动最后处理。
    /// 抬起之后才到的移动找不到拖拽中的挂件，自然被忽略。
    fn consume_pointer(&mut self, frame_dt: f32, camera: &dyn SceneCamera, source: &mut dyn PointerSource) {
        let input = self.inbox.drain();

        for button in input.buttons.into_iter().flatten() {
            if let Some(moved) = button.preceding_move {
                self.track_drag(moved, frame_dt, camera);
            }
            match button.button {
                PointerButton::Down(event) => self.begin_drag(event, camera, source),
                PointerButton::Up(event) => self.end_drag(event, source),
            }
        }
        if let Some(moved) = input.latest_move {
            self.track_drag(moved, frame_dt, camera);
        }
    }

    fn begin_drag(&mut self, event: PointerEvent, camera: &dyn SceneCamera, source: &mut dyn PointerSource) {
        let Some(index) = self.pick(camera, event.client) else {
            return;
        };
        let Some(ray) = camera.ray_from_client(event.client) else {
            return;
        };
        let object = &mut self.objects[index];
        if let Some(mut body) = self.world.body_mut(object.handle) {
            object
                .body
                .pointer_down(&mut body, event.pointer_id, &ray, camera.view_direction(), source);
        }
    }

    fn track_drag(&mut self, event: PointerEvent, frame_dt: f32, camera: &dyn SceneCamera) {
        let Some(ray) = camera.ray_from_client(event.client) else {
            return;
        };
        for object in &mut self.objects {
            let dragged_by_pointer = object
                .body
                .drag_session()
                .is_some_and(|session| session.pointer_id == event.pointer_id);
            if !dragged_by_pointer {
                continue;
            }
            if let Some(mut body) = self.world.body_mut(object.handle) {
                object.body.pointer_move(&mut body, &ray, frame_dt);
            }
        }
    }

    fn end_drag(&mut self, event: PointerEvent, source: &mut dyn PointerSource) {
        for object in &mut self.objects {
            if !object.body.is_dragging() {
                continue;
            }
            if let Some(mut body) = self.world.body_mut(object.handle) {
                object.body.pointer_up(&mut body, event.pointer_id, source);
            }
        }
    }
}
