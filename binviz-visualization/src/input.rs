//! Translation of winit window events into camera input events

use binviz_core::{InputEvent, PointerButton};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Pixels of touchpad scrolling treated as one wheel line
pub const PIXELS_PER_LINE: f64 = 100.0;

/// Tracks the modifier and cursor state needed to turn window events into
/// [`InputEvent`]s
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    modifiers: ModifiersState,
    shift_key_down: bool,
    cursor: PhysicalPosition<f64>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the fast-zoom modifier is held
    pub fn fast_zoom(&self) -> bool {
        self.modifiers.shift_key() || self.shift_key_down
    }

    /// Translate `event`, updating the tracked state. Events the camera does
    /// not care about yield `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight) =
                    event.physical_key
                {
                    self.shift_key_down = event.state == ElementState::Pressed;
                }
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                Some(InputEvent::PointerMove {
                    x: position.x as f32,
                    y: position.y as f32,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = pointer_button(*button);
                Some(match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        button,
                        x: self.cursor.x as f32,
                        y: self.cursor.y as f32,
                    },
                    ElementState::Released => InputEvent::PointerUp { button },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll {
                delta: scroll_lines(delta),
                fast: self.fast_zoom(),
            }),
            WindowEvent::Resized(size) => Some(InputEvent::Resize {
                width: size.width as f32,
                height: size.height as f32,
            }),
            _ => None,
        }
    }
}

/// Map a winit mouse button onto a pointer button
pub fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(id) => PointerButton::Other(id),
    }
}

/// Vertical scroll amount in wheel lines, positive away from the user
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
    }
}
