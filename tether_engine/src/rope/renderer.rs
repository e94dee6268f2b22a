//! 绳子渲染
//!
//! 绳子不是物理关节，每帧按锚点和挂件的*渲染*位姿重新生成，
//! 所以总是贴着画出来的挂件，而不是被约束修正过的物理位姿。

use glam::Vec3;

use crate::tether::{TetherOptions, VisualState};

use super::curve::RopeCurve;
use super::tube::TubeMesh;

/// 挂点偏向（同一锚点下的两个挂件一左一右）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachSide {
    Left,
    Right,
}

impl AttachSide {
    fn sign(self) -> f32 {
        match self {
            AttachSide::Left => -1.0,
            AttachSide::Right => 1.0,
        }
    }

    /// 挂件顶部附近的局部挂点
    pub fn local_offset(self, collider_radius: f32) -> Vec3 {
        Vec3::new(self.sign() * collider_radius * 0.2, collider_radius * 0.9, 0.0)
    }
}

/// 单根绳子
pub struct RopeRenderer {
    /// 挂件局部空间里的挂点
    pub attach_offset: Vec3,
    pub string_length: f32,
    pub sag_factor: f32,
    curve: RopeCurve,
    mesh: TubeMesh,
    attach_point: Vec3,
}

impl RopeRenderer {
    pub fn new(anchor: Vec3, side: AttachSide, options: &TetherOptions) -> Self {
        Self {
            attach_offset: side.local_offset(options.collider_radius),
            string_length: options.string_length,
            sag_factor: options.sag_factor,
            curve: RopeCurve::new(anchor),
            mesh: TubeMesh::new(options.string_thickness),
            attach_point: anchor,
        }
    }

    pub fn curve(&self) -> &RopeCurve {
        &self.curve
    }

    pub fn mesh(&self) -> &TubeMesh {
        &self.mesh
    }

    /// 渲染端上传后通过它清除脏标记
    pub fn mesh_mut(&mut self) -> &mut TubeMesh {
        &mut self.mesh
    }

    /// 上一次更新时的世界挂点
    pub fn attach_point(&self) -> Vec3 {
        self.attach_point
    }

    /// 每帧调用：重算挂点、控制点和管道顶点
    pub fn update(&mut self, anchor: Vec3, visual: &VisualState) {
        let attach = visual.transform_point(self.attach_offset);
        if !attach.is_finite() {
            return;
        }
        self.attach_point = attach;
        self.curve.rebuild(anchor, attach, self.string_length, self.sag_factor);
        self.mesh.update(&self.curve);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_attach_follows_visual_pose() {
        let options = TetherOptions::default();
        let anchor = Vec3::new(0.0, 3.2, 0.0);
        let mut rope = RopeRenderer::new(anchor, AttachSide::Left, &options);

        let visual = VisualState::new(Vec3::new(0.3, 1.5, 0.0), Quat::from_rotation_z(0.4));
        rope.update(anchor, &visual);

        let expected = visual.position + visual.rotation * rope.attach_offset;
        assert!((rope.attach_point() - expected).length() < 1e-6);
        assert_eq!(rope.curve().points[0], anchor);
        assert_eq!(rope.curve().points[4], expected);
        assert!(rope.mesh().is_dirty());
    }

    #[test]
    fn test_sides_mirror() {
        let left = AttachSide::Left.local_offset(0.35);
        let right = AttachSide::Right.local_offset(0.35);
        assert!(left.x < 0.0 && right.x > 0.0);
        assert_eq!(left.y, right.y);
    }

    #[test]
    fn test_invalid_visual_keeps_last_mesh() {
        let options = TetherOptions::default();
        let anchor = Vec3::new(0.0, 3.2, 0.0);
        let mut rope = RopeRenderer::new(anchor, AttachSide::Right, &options);
        rope.update(anchor, &VisualState::new(Vec3::new(0.0, 1.5, 0.0), Quat::IDENTITY));
        let version = rope.mesh().version();

        rope.update(anchor, &VisualState::new(Vec3::NAN, Quat::IDENTITY));
        assert_eq!(rope.mesh().version(), version);
    }

    #[test]
    fn test_upload_clears_dirty_until_next_update() {
        let options = TetherOptions::default();
        let anchor = Vec3::new(0.0, 3.2, 0.0);
        let mut rope = RopeRenderer::new(anchor, AttachSide::Left, &options);
        let visual = VisualState::new(Vec3::new(0.0, 1.5, 0.0), Quat::IDENTITY);

        rope.update(anchor, &visual);
        rope.mesh_mut().clear_dirty();
        assert!(!rope.mesh().is_dirty());

        rope.update(anchor, &visual);
        assert!(rope.mesh().is_dirty());
        assert_eq!(rope.mesh().version(), 2);
    }
}
