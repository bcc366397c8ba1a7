//! Visualization of binary files as point clouds
//!
//! This crate provides the interactive side of binviz using wgpu and winit:
//! - Command line arguments and viewer configuration
//! - Translation of window events into camera input
//! - Background reloading of files
//! - The interactive viewer

pub mod config;
pub mod input;
pub mod loader;
pub mod viewer;

pub use config::*;
pub use input::*;
pub use loader::*;
pub use viewer::*;

use binviz_core::Result;
use binviz_io::load_point_cloud;

/// Load the file named by `config` and show it until the window is closed.
///
/// The whole file is loaded before the window opens.
pub fn show_file(config: ViewerConfig) -> Result<()> {
    let cloud = load_point_cloud(&config.path, config.read_mode)?;
    log::info!("{} unique points", cloud.len());
    Viewer::new(config, cloud).run()
}
