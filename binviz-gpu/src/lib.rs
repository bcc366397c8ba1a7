//! # binviz GPU
//!
//! wgpu renderer for byte point clouds. Points are drawn one pixel each
//! under an orthographic projection, on a black background, without depth
//! testing.
//!
//! ```rust,no_run
//! use binviz_gpu::{PointCloudRenderer, RenderConfig};
//! use std::sync::Arc;
//! use winit::window::Window;
//!
//! async fn example(window: Arc<Window>) -> binviz_core::Result<()> {
//!     let renderer = PointCloudRenderer::new(window, RenderConfig::default()).await?;
//!     println!("aspect {}", renderer.aspect_ratio());
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod renderer;

pub use device::GpuContext;
pub use renderer::{
    batch_to_vertex_chunks, opengl_to_wgpu_matrix, projection_matrix, CameraUniform,
    PointCloudRenderer, PointVertex, RenderConfig, VIEW_DEPTH,
};
