//! 绳子管道网格
//!
//! 顶点缓冲区在创建时按固定分段数一次分配，之后每帧原地改写。
//! 沿曲线用平行移动标架扫出圆形截面。

use glam::{Quat, Vec2, Vec3};

use super::curve::{catmull_rom, RopeCurve};

/// 纵向分段数
pub const TUBULAR_SEGMENTS: usize = 32;
/// 截面分段数
pub const RADIAL_SEGMENTS: usize = 8;
/// 纵向采样点数
pub const RING_COUNT: usize = TUBULAR_SEGMENTS + 1;
/// 每圈顶点数（首尾重复一个用于贴图接缝）
pub const RING_VERTEX_COUNT: usize = RADIAL_SEGMENTS + 1;
/// 顶点总数
pub const TUBE_VERTEX_COUNT: usize = RING_COUNT * RING_VERTEX_COUNT;
/// 索引总数
pub const TUBE_INDEX_COUNT: usize = TUBULAR_SEGMENTS * RADIAL_SEGMENTS * 6;

/// 单个采样点的局部标架
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

impl RingFrame {
    /// 绳子默认竖直向下
    pub const DOWN: Self = Self {
        tangent: Vec3::NEG_Y,
        normal: Vec3::X,
        binormal: Vec3::Z,
    };

    /// 由切线构造初始标架：取切线最小分量对应的坐标轴作参考
    fn from_tangent(tangent: Vec3) -> Self {
        let abs = tangent.abs();
        let axis = if abs.x <= abs.y && abs.x <= abs.z {
            Vec3::X
        } else if abs.y <= abs.z {
            Vec3::Y
        } else {
            Vec3::Z
        };
        let side = tangent.cross(axis).normalize();
        let normal = tangent.cross(side);
        let binormal = tangent.cross(normal);
        Self { tangent, normal, binormal }
    }

    /// 把标架沿最小旋转平移到新切线上，法线退化时返回 `None`
    fn transported(&self, tangent: Vec3) -> Option<Self> {
        let rotation = Quat::from_rotation_arc(self.tangent, tangent);
        let normal = rotation * self.normal;
        // 去掉累积误差带来的切向分量
        let normal = (normal - tangent * normal.dot(tangent)).try_normalize()?;
        let binormal = tangent.cross(normal);
        Some(Self { tangent, normal, binormal })
    }
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// 包围球
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// 管道网格
pub struct TubeMesh {
    /// 管道半径
    pub radius: f32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    // 每帧复用的临时数据
    centers: [Vec3; RING_COUNT],
    frames: [RingFrame; RING_COUNT],
    aabb: Aabb,
    sphere: BoundingSphere,
    /// 顶点已改写，渲染端尚未上传
    dirty: bool,
    /// 每次改写递增
    version: u64,
}

impl TubeMesh {
    pub fn new(radius: f32) -> Self {
        let mut uvs = Vec::with_capacity(TUBE_VERTEX_COUNT);
        for i in 0..RING_COUNT {
            for j in 0..RING_VERTEX_COUNT {
                uvs.push(Vec2::new(
                    i as f32 / TUBULAR_SEGMENTS as f32,
                    j as f32 / RADIAL_SEGMENTS as f32,
                ));
            }
        }

        Self {
            radius,
            positions: vec![Vec3::ZERO; TUBE_VERTEX_COUNT],
            normals: vec![Vec3::Y; TUBE_VERTEX_COUNT],
            uvs,
            indices: build_indices(),
            centers: [Vec3::ZERO; RING_COUNT],
            frames: [RingFrame::DOWN; RING_COUNT],
            aabb: Aabb { min: Vec3::ZERO, max: Vec3::ZERO },
            sphere: BoundingSphere { center: Vec3::ZERO, radius: 0.0 },
            dirty: false,
            version: 0,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// 三角形索引，创建后不变
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn frames(&self) -> &[RingFrame] {
        &self.frames
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        self.sphere
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// 渲染端上传完后调用
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// 按曲线重写顶点
    pub fn update(&mut self, curve: &RopeCurve) {
        self.sample_curve(curve);
        self.write_vertices();
        self.compute_vertex_normals();
        self.compute_bounds();
        self.dirty = true;
        self.version = self.version.wrapping_add(1);
    }

    /// 采样曲线并计算平行移动标架
    ///
    /// 第一圈沿用上一帧第一圈的标架平移过来，只有第一次更新时从切线构造，
    /// 接缝不会在帧间跳转。切线退化时沿用上一个采样点（或上一帧）的标架。
    fn sample_curve(&mut self, curve: &RopeCurve) {
        for i in 0..RING_COUNT {
            let u = i as f32 / TUBULAR_SEGMENTS as f32;
            let (center, raw_tangent) = catmull_rom(&curve.points, u);
            self.centers[i] = center;

            let previous = if i == 0 { self.frames[0] } else { self.frames[i - 1] };
            let Some(tangent) = raw_tangent.try_normalize() else {
                self.frames[i] = previous;
                continue;
            };

            if i == 0 && self.version == 0 {
                self.frames[0] = RingFrame::from_tangent(tangent);
                continue;
            }
            self.frames[i] = previous.transported(tangent).unwrap_or(previous);
        }
    }

    fn write_vertices(&mut self) {
        for i in 0..RING_COUNT {
            let center = self.centers[i];
            let frame = self.frames[i];
            for j in 0..RING_VERTEX_COUNT {
                let v = j as f32 / RADIAL_SEGMENTS as f32 * std::f32::consts::TAU;
                let sin = v.sin();
                let cos = -v.cos();
                let direction = (frame.normal * cos + frame.binormal * sin).normalize_or_zero();
                self.positions[i * RING_VERTEX_COUNT + j] = center + direction * self.radius;
            }
        }
    }

    /// 面积加权的面法线累加
    fn compute_vertex_normals(&mut self) {
        self.normals.fill(Vec3::ZERO);
        for triangle in self.indices.chunks_exact(3) {
            let (a, b, c) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }
        for (i, normal) in self.normals.iter_mut().enumerate() {
            let ring = i / RING_VERTEX_COUNT;
            *normal = normal
                .try_normalize()
                .or_else(|| (self.positions[i] - self.centers[ring]).try_normalize())
                .unwrap_or(Vec3::Y);
        }
    }

    fn compute_bounds(&mut self) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for position in &self.positions {
            min = min.min(*position);
            max = max.max(*position);
        }
        self.aabb = Aabb { min, max };

        let center = self.aabb.center();
        let radius = self
            .positions
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0f32, f32::max)
            .sqrt();
        self.sphere = BoundingSphere { center, radius };
    }
}

/// 三角形索引（与几何无关，只算一次）
fn build_indices() -> Vec<u32> {
    let mut indices = Vec::with_capacity(TUBE_INDEX_COUNT);
    let stride = RING_VERTEX_COUNT as u32;
    for j in 1..=TUBULAR_SEGMENTS as u32 {
        for i in 1..=RADIAL_SEGMENTS as u32 {
            let a = stride * (j - 1) + (i - 1);
            let b = stride * j + (i - 1);
            let c = stride * j + i;
            let d = stride * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    indices
}
