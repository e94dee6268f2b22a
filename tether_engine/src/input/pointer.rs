//! 指针事件
//!
//! 事件与帧循环异步到达。这里只记录最新状态：按下/抬起按到达顺序保留，
//! 相邻两次按键之间的多次移动合并为最后一次，由帧循环每帧取走一次。
//! 移动记在它之后的那次按键上，抬起之后才到的移动不会算进拖拽。

use glam::Vec2;

/// 指针事件源（负责指针捕获）
pub trait PointerSource {
    fn set_pointer_capture(&mut self, pointer_id: u32);
    fn release_pointer_capture(&mut self, pointer_id: u32);
}

/// 不做任何捕获的事件源
pub struct NullPointerSource;

impl PointerSource for NullPointerSource {
    fn set_pointer_capture(&mut self, _pointer_id: u32) {}
    fn release_pointer_capture(&mut self, _pointer_id: u32) {}
}

/// 单个指针事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    /// 客户区坐标（像素）
    pub client: Vec2,
}

/// 按下/抬起
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerButton {
    Down(PointerEvent),
    Up(PointerEvent),
}

/// 一次按键，以及它之前（上一次按键之后）的最后一次移动
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonInput {
    pub button: PointerButton,
    pub preceding_move: Option<PointerEvent>,
}

/// 一帧内收集到的指针状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerFrame {
    /// 按到达顺序排列的按键事件，同一帧最多一按一抬
    pub buttons: [Option<ButtonInput>; 2],
    /// 最后一次按键之后的最后一次移动
    pub latest_move: Option<PointerEvent>,
}

impl PointerFrame {
    pub fn is_empty(&self) -> bool {
        self.buttons.iter().all(Option::is_none) && self.latest_move.is_none()
    }
}

/// 指针事件收件箱
#[derive(Debug, Default)]
pub struct PointerInbox {
    pending: PointerFrame,
}

impl PointerInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.push_button(PointerButton::Down(event));
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.pending.latest_move = Some(event);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.push_button(PointerButton::Up(event));
    }

    /// 取走本帧状态
    pub fn drain(&mut self) -> PointerFrame {
        std::mem::take(&mut self.pending)
    }

    fn push_button(&mut self, button: PointerButton) {
        let input = ButtonInput {
            button,
            preceding_move: self.pending.latest_move.take(),
        };
        match self.pending.buttons.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => *slot = Some(input),
            None => {
                // 同一帧内按键过多，只保留最后两次
                self.pending.buttons[0] = self.pending.buttons[1];
                self.pending.buttons[1] = Some(input);
            }
        }
    }
}
