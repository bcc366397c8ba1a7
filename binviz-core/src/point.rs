//! Point types and the triplet key packing

use nalgebra::{Point3, Vector3};
use std::f32::consts::TAU;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Three consecutive input bytes packed into the low 24 bits of a `u32`.
///
/// Byte 0 of the triplet lands in the least-significant byte and byte 2 in
/// the most-significant byte of the 24-bit value, so ordering keys orders
/// triplets by `(b2, b1, b0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripletKey(u32);

impl TripletKey {
    /// Pack a triplet `[b0, b1, b2]`
    #[inline]
    pub fn pack(triplet: [u8; 3]) -> Self {
        let [b0, b1, b2] = triplet;
        Self(((b2 as u32) << 16) | ((b1 as u32) << 8) | b0 as u32)
    }

    /// Wrap a raw value, keeping only the low 24 bits
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw & 0x00FF_FFFF)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Recover the source triplet `[b0, b1, b2]`
    #[inline]
    pub fn unpack(self) -> [u8; 3] {
        [self.0 as u8, (self.0 >> 8) as u8, (self.0 >> 16) as u8]
    }

    /// Map the key onto the unit ball.
    ///
    /// The high byte and the middle byte become the two angles (each spanning
    /// a full turn) and the low byte becomes the radius.
    pub fn to_position(self) -> Point3f {
        let x = ((self.0 >> 16) & 0xFF) as f32 / 255.0;
        let y = ((self.0 >> 8) & 0xFF) as f32 / 255.0;
        let z = (self.0 & 0xFF) as f32 / 255.0;

        let x_rot = x * TAU;
        let y_rot = y * TAU;
        let radius = z;

        let (sin_x, cos_x) = x_rot.sin_cos();
        let (sin_y, cos_y) = y_rot.sin_cos();

        Point3f::new(
            radius * sin_x * cos_y,
            radius * sin_x * sin_y,
            radius * cos_x,
        )
    }
}

/// One distinct triplet of the input, placed in 3D
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BytePoint {
    pub position: Point3f,
    /// Occurrences of the same triplet beyond the first
    pub duplicate_count: u64,
    /// Position in the key-sorted, deduplicated sequence
    pub sequence_index: usize,
    pub key: TripletKey,
}

impl BytePoint {
    /// Create the first occurrence of `key` at `sequence_index`
    pub fn new(key: TripletKey, sequence_index: usize) -> Self {
        Self {
            position: key.to_position(),
            duplicate_count: 0,
            sequence_index,
            key,
        }
    }

    /// Total number of times the triplet appeared in the input
    pub fn occurrences(&self) -> u64 {
        self.duplicate_count + 1
    }
}

/// A point with an RGB color, as handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPoint {
    pub position: Point3f,
    /// Unclamped color channels
    pub color: [f32; 3],
}
