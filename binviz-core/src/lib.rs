//! Core data structures for binviz
//!
//! This crate turns raw bytes into a deduplicated 3D point cloud and models
//! the damped rotate/zoom camera used to look at it:
//! - Triplet keys and points
//! - Point cloud construction with duplicate counting
//! - Point coloring
//! - Camera controller and transforms
//! - The per-frame loop and the renderer seam
//!
//! ```
//! use binviz_core::{build_point_cloud, TripletKey};
//!
//! let cloud = build_point_cloud(&[0, 0, 0, 0, 0, 0, 255, 255, 255]).unwrap();
//! assert_eq!(cloud.len(), 2);
//! assert_eq!(cloud.find(TripletKey::pack([0, 0, 0])).unwrap().duplicate_count, 1);
//! ```

pub mod camera;
pub mod color;
pub mod error;
pub mod frame;
pub mod input;
pub mod point;
pub mod point_cloud;
pub mod transform;

pub use camera::*;
pub use color::*;
pub use error::*;
pub use frame::*;
pub use input::*;
pub use point::*;
pub use point_cloud::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
