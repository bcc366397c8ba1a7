//! Input events understood by the camera controller

/// Pointer button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other(u16),
}

/// Size of the drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions can be divided by
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A discrete input event, in viewport pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, x: f32, y: f32 },
    PointerUp { button: PointerButton },
    PointerMove { x: f32, y: f32 },
    /// Signed scroll amount in lines; `fast` is set while the fast-zoom
    /// modifier is held
    Scroll { delta: f32, fast: bool },
    Resize { width: f32, height: f32 },
}
