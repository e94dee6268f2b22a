//! 输入：相机射线、指针事件

mod camera;
mod pointer;
mod ray;

pub use camera::{PerspectiveCamera, SceneCamera};
pub use pointer::{
    ButtonInput, NullPointerSource, PointerButton, PointerEvent, PointerFrame, PointerInbox, PointerSource,
};
pub use ray::{Plane, Ray};
