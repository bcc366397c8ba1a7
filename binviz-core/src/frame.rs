//! Per-frame orchestration: camera step, then draw
//!
//! [`FrameLoop`] owns the active point set as a shared, immutable snapshot.
//! Loading a new set builds it completely before swapping the snapshot, so a
//! renderer only ever sees a whole cloud.

use crate::camera::CameraController;
use crate::error::Result;
use crate::input::{InputEvent, Viewport};
use crate::point::RenderPoint;
use crate::point_cloud::{ByteCloud, PointCloudBuilder};
use crate::transform::Transform3D;
use std::sync::Arc;

/// Colored points of one installed cloud.
///
/// `generation` changes whenever a different cloud is installed, so renderers
/// can keep uploaded vertex data until it does.
#[derive(Debug, Clone)]
pub struct PointBatch {
    generation: u64,
    points: Arc<[RenderPoint]>,
}

impl PointBatch {
    pub fn new(generation: u64, points: Vec<RenderPoint>) -> Self {
        Self {
            generation,
            points: points.into(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn points(&self) -> &[RenderPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Draws a point batch under a camera transform
pub trait Renderer {
    /// Submit one frame. Color channels may fall outside `[0, 1]`; the
    /// renderer clamps them.
    fn draw_points(&mut self, batch: &PointBatch, transform: &Transform3D) -> Result<()>;
}

/// Camera plus the active cloud, advanced once per frame
pub struct FrameLoop {
    camera: CameraController,
    builder: PointCloudBuilder,
    cloud: Arc<ByteCloud>,
    batch: PointBatch,
    next_generation: u64,
}

impl FrameLoop {
    pub fn new(cloud: ByteCloud, viewport: Viewport) -> Self {
        let batch = PointBatch::new(0, cloud.render_points());
        Self {
            camera: CameraController::new(viewport),
            builder: PointCloudBuilder::new(),
            cloud: Arc::new(cloud),
            batch,
            next_generation: 1,
        }
    }

    /// Use `builder` for [`FrameLoop::load_bytes`]
    pub fn with_builder(mut self, builder: PointCloudBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    /// The active cloud
    pub fn cloud(&self) -> Arc<ByteCloud> {
        Arc::clone(&self.cloud)
    }

    pub fn batch(&self) -> &PointBatch {
        &self.batch
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        self.camera.handle_event(event);
    }

    /// Replace the active cloud. The camera keeps its state.
    pub fn install(&mut self, cloud: ByteCloud) {
        let batch = PointBatch::new(self.next_generation, cloud.render_points());
        self.next_generation += 1;
        self.cloud = Arc::new(cloud);
        self.batch = batch;
        log::info!("{} unique points", self.cloud.len());
    }

    /// Build a cloud from `bytes` and install it. On error the active cloud
    /// is left as it was.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let cloud = self.builder.build(bytes)?;
        self.install(cloud);
        Ok(())
    }

    /// Advance the camera by `delta_time` seconds and draw the active cloud
    pub fn tick<R: Renderer + ?Sized>(&mut self, delta_time: f32, renderer: &mut R) -> Result<()> {
        self.camera.advance(delta_time);
        let transform = self.camera.current_transform();
        renderer.draw_points(&self.batch, &transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, LoadError};
    use crate::input::PointerButton;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(u64, usize, Transform3D)>,
    }

    impl Renderer for RecordingRenderer {
        fn draw_points(&mut self, batch: &PointBatch, transform: &Transform3D) -> Result<()> {
            self.frames.push((batch.generation(), batch.len(), *transform));
            Ok(())
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn draw_points(&mut self, _batch: &PointBatch, _transform: &Transform3D) -> Result<()> {
            Err(Error::Gpu("surface lost".to_string()))
        }
    }

    fn frame_loop() -> FrameLoop {
        let cloud = ByteCloud::from_bytes(&[0, 0, 0, 0, 0, 0, 255, 255, 255]).unwrap();
        FrameLoop::new(cloud, Viewport::new(640.0, 480.0))
    }

    #[test]
    fn test_tick_draws_active_batch() {
        let mut frames = frame_loop();
        let mut renderer = RecordingRenderer::default();

        frames.tick(0.016, &mut renderer).unwrap();
        frames.tick(0.016, &mut renderer).unwrap();

        assert_eq!(renderer.frames.len(), 2);
        assert_eq!(renderer.frames[0].0, 0);
        assert_eq!(renderer.frames[0].1, 2);
    }

    #[test]
    fn test_tick_advances_camera_before_drawing() {
        let mut frames = frame_loop();
        frames.handle_event(InputEvent::Scroll { delta: 1.0, fast: true });
        let mut renderer = RecordingRenderer::default();

        frames.tick(0.5, &mut renderer).unwrap();

        assert_relative_eq!(frames.camera().state().zoom_level, 1.5);
        assert_eq!(renderer.frames[0].2, frames.camera().current_transform());
    }

    #[test]
    fn test_load_bytes_swaps_cloud() {
        let mut frames = frame_loop();
        let before = frames.cloud();

        frames.load_bytes(&[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();

        assert_eq!(frames.cloud().len(), 3);
        assert_eq!(frames.batch().generation(), 1);
        // Old snapshot is still intact for anyone holding it.
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn test_failed_load_keeps_previous_cloud() {
        let mut frames = frame_loop();
        let err = frames.load_bytes(&[1, 2]).unwrap_err();

        assert_eq!(err.as_load_error(), Some(&LoadError::EmptyOrTooSmall { len: 2 }));
        assert_eq!(frames.cloud().len(), 2);
        assert_eq!(frames.batch().generation(), 0);
    }

    #[test]
    fn test_install_keeps_camera_state() {
        let mut frames = frame_loop();
        frames.handle_event(InputEvent::PointerDown {
            button: PointerButton::Primary,
            x: 0.0,
            y: 0.0,
        });
        frames.handle_event(InputEvent::PointerMove { x: 64.0, y: 0.0 });
        let target = frames.camera().state().target_rotation_x;

        frames.install(ByteCloud::from_bytes(&[9, 9, 9]).unwrap());

        assert_eq!(frames.camera().state().target_rotation_x, target);
        assert_eq!(frames.batch().len(), 1);
    }

    #[test]
    fn test_renderer_errors_propagate() {
        let mut frames = frame_loop();
        let result = frames.tick(0.016, &mut FailingRenderer);
        assert!(matches!(result, Err(Error::Gpu(_))));
    }
}
