//! Damped rotate/zoom camera driven by pointer and scroll events
//!
//! Events only move the targets. [`CameraController::advance`] pulls the
//! visible rotation and zoom towards them once per frame, which gives the
//! smoothed motion.

use crate::input::{InputEvent, PointerButton, Viewport};
use crate::point::Vector3f;
use crate::transform::Transform3D;

/// Degrees of target rotation per full viewport of drag
pub const DRAG_DEGREES_PER_VIEWPORT: f32 = 100.0;
/// Scroll lines per unit of zoom without the fast modifier
pub const SCROLL_LINES_PER_ZOOM: f32 = 25.0;
/// Lowest zoom target scrolling can reach
pub const MIN_ZOOM: f32 = 0.1;
/// Tilt applied under the user rotation so the default view is not head-on
pub const DEFAULT_TILT_DEGREES: f32 = -45.0;

/// Whether a pointer button is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Rotation and zoom, current and target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Degrees about the vertical axis
    pub rotation_x: f32,
    /// Degrees about the horizontal axis
    pub rotation_y: f32,
    pub target_rotation_x: f32,
    pub target_rotation_y: f32,
    pub zoom_level: f32,
    pub zoom_target: f32,
    pub pointer_down: bool,
    pub last_pointer_x: f32,
    pub last_pointer_y: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            target_rotation_x: 0.0,
            target_rotation_y: 0.0,
            zoom_level: 1.0,
            zoom_target: 1.0,
            pointer_down: false,
            last_pointer_x: 0.0,
            last_pointer_y: 0.0,
        }
    }
}

/// Turns input events into camera state
#[derive(Debug, Clone)]
pub struct CameraController {
    state: CameraState,
    viewport: Viewport,
}

impl CameraController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: CameraState::default(),
            viewport,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn drag_state(&self) -> DragState {
        if self.state.pointer_down {
            DragState::Dragging
        } else {
            DragState::Idle
        }
    }

    /// Apply one input event
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { button, x, y } => self.pointer_down(button, x, y),
            InputEvent::PointerUp { button } => self.pointer_up(button),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::Scroll { delta, fast } => self.scroll(delta, fast),
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Start dragging from `(x, y)`. Any button drags.
    pub fn pointer_down(&mut self, _button: PointerButton, x: f32, y: f32) {
        self.state.pointer_down = true;
        self.state.last_pointer_x = x;
        self.state.last_pointer_y = y;
    }

    pub fn pointer_up(&mut self, _button: PointerButton) {
        self.state.pointer_down = false;
    }

    /// Track the pointer; while dragging, turn the movement into target
    /// rotation
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.state.pointer_down && self.viewport.is_usable() {
            let dx = (x - self.state.last_pointer_x) / self.viewport.width
                * DRAG_DEGREES_PER_VIEWPORT;
            let dy = (y - self.state.last_pointer_y) / self.viewport.height
                * DRAG_DEGREES_PER_VIEWPORT;
            self.state.target_rotation_x -= dx;
            self.state.target_rotation_y -= dy;
        }
        self.state.last_pointer_x = x;
        self.state.last_pointer_y = y;
    }

    /// Move the zoom target; `fast` skips the line divisor
    pub fn scroll(&mut self, delta: f32, fast: bool) {
        if !delta.is_finite() {
            return;
        }
        if fast {
            self.state.zoom_target += delta;
        } else {
            self.state.zoom_target += delta / SCROLL_LINES_PER_ZOOM;
        }
        self.state.zoom_target = self.state.zoom_target.max(MIN_ZOOM);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Send the targets back to the initial view; the visible state follows
    /// through the usual damping
    pub fn reset(&mut self) {
        self.state.target_rotation_x = 0.0;
        self.state.target_rotation_y = 0.0;
        self.state.zoom_target = 1.0;
    }

    /// Move the visible state a `delta_time` fraction of the way to the
    /// targets.
    ///
    /// `delta_time` is used directly as the interpolation fraction, so a step
    /// of one second or more lands on or past the target.
    pub fn advance(&mut self, delta_time: f32) {
        let dt = if delta_time.is_finite() && delta_time > 0.0 {
            delta_time
        } else {
            0.0
        };

        let s = &mut self.state;
        s.zoom_level += (s.zoom_target - s.zoom_level) * dt;
        s.rotation_x += (s.target_rotation_x - s.rotation_x) * dt;
        s.rotation_y += (s.target_rotation_y - s.rotation_y) * dt;
    }

    /// Model transform for the current state.
    ///
    /// Applied to a point: uniform zoom scale, then the fixed tilt about
    /// `(1, 0, 1)`, then `rotation_x` about the Y axis, then `rotation_y`
    /// about the X axis.
    pub fn current_transform(&self) -> Transform3D {
        let s = &self.state;
        let about_x = Transform3D::rotation_degrees(Vector3f::x(), s.rotation_y);
        let about_y = Transform3D::rotation_degrees(Vector3f::y(), s.rotation_x);
        let tilt =
            Transform3D::rotation_degrees(Vector3f::new(1.0, 0.0, 1.0), DEFAULT_TILT_DEGREES);
        let scale = Transform3D::uniform_scaling(s.zoom_level);

        about_x * about_y * tilt * scale
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(Viewport::new(640.0, 480.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point3f;
    use approx::assert_relative_eq;

    fn controller() -> CameraController {
        CameraController::new(Viewport::new(200.0, 100.0))
    }

    #[test]
    fn test_initial_state() {
        let cam = controller();
        let s = cam.state();
        assert_eq!(s.zoom_level, 1.0);
        assert_eq!(s.zoom_target, 1.0);
        assert_eq!(s.rotation_x, 0.0);
        assert_eq!(s.target_rotation_y, 0.0);
        assert_eq!(cam.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_scroll_one_unit() {
        let mut cam = controller();
        cam.scroll(25.0, false);
        assert_eq!(cam.state().zoom_target, 2.0);
    }

    #[test]
    fn test_fast_scroll_skips_divisor() {
        let mut cam = controller();
        cam.handle_event(InputEvent::Scroll { delta: 3.0, fast: true });
        assert_eq!(cam.state().zoom_target, 4.0);
    }

    #[test]
    fn test_zoom_floor() {
        let mut cam = controller();
        cam.scroll(-100.0, true);
        assert_eq!(cam.state().zoom_target, MIN_ZOOM);
        for _ in 0..50 {
            cam.scroll(-7.0, false);
            assert!(cam.state().zoom_target >= MIN_ZOOM);
        }
    }

    #[test]
    fn test_non_finite_scroll_ignored() {
        let mut cam = controller();
        cam.scroll(f32::NAN, false);
        cam.scroll(f32::INFINITY, true);
        assert_eq!(cam.state().zoom_target, 1.0);
    }

    #[test]
    fn test_drag_moves_targets_only() {
        let mut cam = controller();
        cam.handle_event(InputEvent::PointerDown {
            button: PointerButton::Primary,
            x: 10.0,
            y: 10.0,
        });
        assert_eq!(cam.drag_state(), DragState::Dragging);

        cam.handle_event(InputEvent::PointerMove { x: 30.0, y: 20.0 });
        let s = cam.state();
        assert_relative_eq!(s.target_rotation_x, -10.0);
        assert_relative_eq!(s.target_rotation_y, -10.0);
        assert_eq!(s.rotation_x, 0.0);
        assert_eq!(s.rotation_y, 0.0);
        assert_eq!((s.last_pointer_x, s.last_pointer_y), (30.0, 20.0));
    }

    #[test]
    fn test_hover_updates_baseline_without_rotating() {
        let mut cam = controller();
        cam.pointer_move(50.0, 50.0);
        cam.pointer_move(150.0, 80.0);
        assert_eq!(cam.state().target_rotation_x, 0.0);
        assert_eq!(cam.state().last_pointer_x, 150.0);

        cam.pointer_up(PointerButton::Primary);
        assert_eq!(cam.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_release_stops_drag() {
        let mut cam = controller();
        cam.pointer_down(PointerButton::Secondary, 0.0, 0.0);
        cam.pointer_move(20.0, 0.0);
        cam.pointer_up(PointerButton::Secondary);
        cam.pointer_move(120.0, 0.0);
        assert_relative_eq!(cam.state().target_rotation_x, -10.0);
    }

    #[test]
    fn test_zero_viewport_ignores_drag() {
        let mut cam = controller();
        cam.handle_event(InputEvent::Resize { width: 0.0, height: 100.0 });
        cam.pointer_down(PointerButton::Primary, 0.0, 0.0);
        cam.pointer_move(20.0, 20.0);
        assert_eq!(cam.state().target_rotation_x, 0.0);
        assert_eq!(cam.state().last_pointer_x, 20.0);
    }

    #[test]
    fn test_advance_step() {
        let mut cam = controller();
        cam.scroll(25.0, false);
        cam.advance(0.5);
        assert_relative_eq!(cam.state().zoom_level, 1.5);
    }

    #[test]
    fn test_advance_overshoots_past_one_second() {
        let mut cam = controller();
        cam.scroll(25.0, false);
        cam.advance(2.0);
        assert_relative_eq!(cam.state().zoom_level, 3.0);
    }

    #[test]
    fn test_advance_ignores_negative_and_nan() {
        let mut cam = controller();
        cam.scroll(25.0, false);
        cam.advance(-1.0);
        cam.advance(f32::NAN);
        assert_eq!(cam.state().zoom_level, 1.0);
    }

    #[test]
    fn test_damping_converges_monotonically() {
        let mut cam = controller();
        cam.pointer_down(PointerButton::Primary, 0.0, 0.0);
        cam.pointer_move(100.0, -50.0);
        cam.scroll(50.0, false);

        let mut last_gap = f32::INFINITY;
        for _ in 0..2000 {
            cam.advance(1.0 / 60.0);
            let gap = (cam.state().zoom_target - cam.state().zoom_level).abs();
            assert!(gap <= last_gap);
            last_gap = gap;
        }

        let s = cam.state();
        assert_relative_eq!(s.zoom_level, s.zoom_target, epsilon = 1e-3);
        assert_relative_eq!(s.rotation_x, s.target_rotation_x, epsilon = 1e-3);
        assert_relative_eq!(s.rotation_y, s.target_rotation_y, epsilon = 1e-3);
    }

    #[test]
    fn test_reset_moves_targets() {
        let mut cam = controller();
        cam.scroll(10.0, true);
        cam.pointer_down(PointerButton::Primary, 0.0, 0.0);
        cam.pointer_move(40.0, 40.0);
        cam.advance(0.5);
        cam.reset();

        let s = cam.state();
        assert_eq!(s.zoom_target, 1.0);
        assert_eq!(s.target_rotation_x, 0.0);
        assert!(s.zoom_level > 1.0);
    }

    #[test]
    fn test_transform_scales_by_zoom() {
        let mut cam = controller();
        cam.scroll(1.0, true);
        cam.advance(1.0);

        let p = cam.current_transform().transform_point(&Point3f::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p.coords.norm(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_default_transform_is_tilt_only() {
        let cam = controller();
        let expected =
            Transform3D::rotation_degrees(Vector3f::new(1.0, 0.0, 1.0), DEFAULT_TILT_DEGREES);
        assert_relative_eq!(cam.current_transform().matrix, expected.matrix, epsilon = 1e-6);

        // The tilt axis itself is left in place.
        let axis = Point3f::new(1.0, 0.0, 1.0);
        let p = cam.current_transform().transform_point(&axis);
        assert_relative_eq!(p, axis, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_composition_order() {
        let mut cam = controller();
        cam.pointer_down(PointerButton::Primary, 0.0, 0.0);
        // 180 px of 200 -> 90 degrees about Y; 45 px of 100 -> 45 degrees about X.
        cam.pointer_move(-180.0, -45.0);
        cam.advance(1.0);
        assert_relative_eq!(cam.state().rotation_x, 90.0, epsilon = 1e-4);
        assert_relative_eq!(cam.state().rotation_y, 45.0, epsilon = 1e-4);

        let expected = Transform3D::rotation_degrees(Vector3f::x(), 45.0)
            * Transform3D::rotation_degrees(Vector3f::y(), 90.0)
            * Transform3D::rotation_degrees(Vector3f::new(1.0, 0.0, 1.0), DEFAULT_TILT_DEGREES)
            * Transform3D::uniform_scaling(1.0);
        assert_relative_eq!(cam.current_transform().matrix, expected.matrix, epsilon = 1e-5);
    }
}
