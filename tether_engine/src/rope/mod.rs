//! 绳子：控制点、插值曲线、管道网格

mod curve;
mod renderer;
mod tube;

pub use curve::{catmull_rom, RopeCurve, ROPE_POINT_COUNT};
pub use renderer::{AttachSide, RopeRenderer};
pub use tube::{
    Aabb, BoundingSphere, RingFrame, TubeMesh, RADIAL_SEGMENTS, RING_COUNT, RING_VERTEX_COUNT,
    TUBE_INDEX_COUNT, TUBE_VERTEX_COUNT, TUBULAR_SEGMENTS,
};
