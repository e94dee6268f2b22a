//! 挂件核心：绳长约束、拖拽、视觉平滑
//!
//! 只依赖 [`RigidBodyHandle`] 能力接口，不依赖具体物理引擎。

mod body;
mod constraint;
mod drag;
mod draggable;
mod options;
mod smoothing;
mod wobble;

pub use body::{BodyMode, RigidBodyHandle};
pub use constraint::{
    clamp_to_tether, orientation_torque, rest_point, restoring_delta, tether_correction,
    ConstraintSolver, TetherCorrection, NOMINAL_DT,
};
pub use drag::{DragSession, VelocityHistory, VELOCITY_HISTORY_LEN};
pub use draggable::{DraggableBody, TetherPhase};
pub use options::TetherOptions;
pub use smoothing::{VisualSmoother, VisualState};
pub use wobble::{NoWobble, SeededWobble, WobbleSource};
