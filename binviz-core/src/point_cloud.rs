//! Building a deduplicated point cloud from raw bytes
//!
//! Every complete triplet of the input is packed into a [`TripletKey`]. The
//! keys are sorted so equal triplets end up adjacent, then a single linear
//! pass emits one [`BytePoint`] per distinct key and counts the repeats.

use crate::color::byte_point_color;
use crate::error::{LoadError, Result};
use crate::point::{BytePoint, RenderPoint, TripletKey};
use std::ops::Index;

/// Bytes consumed per point
pub const TRIPLET_LEN: usize = 3;

/// Triplet count from which the `parallel` feature hands packing and sorting
/// to rayon
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 20;

/// The immutable point set built from one byte buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ByteCloud {
    points: Vec<BytePoint>,
    triplet_count: usize,
    dropped_bytes: usize,
}

impl ByteCloud {
    /// Build a cloud with the default builder
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        PointCloudBuilder::new().build(bytes)
    }

    /// Points in ascending key order
    pub fn points(&self) -> &[BytePoint] {
        &self.points
    }

    /// Number of distinct triplets
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BytePoint> {
        self.points.iter()
    }

    /// Number of complete triplets read from the input
    pub fn triplet_count(&self) -> usize {
        self.triplet_count
    }

    /// Trailing bytes that did not form a full triplet (0, 1 or 2)
    pub fn dropped_bytes(&self) -> usize {
        self.dropped_bytes
    }

    /// Sum of all duplicate counts
    pub fn duplicate_total(&self) -> u64 {
        self.points.iter().map(|p| p.duplicate_count).sum()
    }

    /// Find the point built from `key`
    pub fn find(&self, key: TripletKey) -> Option<&BytePoint> {
        self.points
            .binary_search_by_key(&key, |p| p.key)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Positions and colors in sequence order, ready for a renderer
    pub fn render_points(&self) -> Vec<RenderPoint> {
        let total = self.points.len();
        self.points
            .iter()
            .map(|p| RenderPoint {
                position: p.position,
                color: byte_point_color(p, total),
            })
            .collect()
    }
}

impl Index<usize> for ByteCloud {
    type Output = BytePoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a ByteCloud {
    type Item = &'a BytePoint;
    type IntoIter = std::slice::Iter<'a, BytePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Turns a byte buffer into a [`ByteCloud`]
#[derive(Debug, Clone)]
pub struct PointCloudBuilder {
    parallel_threshold: usize,
}

impl PointCloudBuilder {
    pub fn new() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Set the triplet count above which the `parallel` feature kicks in.
    /// Without that feature the value is ignored.
    pub fn with_parallel_threshold(mut self, triplets: usize) -> Self {
        self.parallel_threshold = triplets;
        self
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Build the deduplicated cloud.
    ///
    /// Fails with [`LoadError::EmptyOrTooSmall`] when `bytes` holds fewer than
    /// three bytes. Trailing bytes that do not complete a triplet are ignored.
    pub fn build(&self, bytes: &[u8]) -> Result<ByteCloud> {
        if bytes.len() < TRIPLET_LEN {
            return Err(LoadError::EmptyOrTooSmall { len: bytes.len() }.into());
        }

        let dropped_bytes = bytes.len() % TRIPLET_LEN;
        let usable = &bytes[..bytes.len() - dropped_bytes];
        let keys = self.sorted_keys(usable);
        let triplet_count = keys.len();

        // Sized exactly so the output never grows past the distinct count.
        let distinct = distinct_sorted(&keys);
        let mut points: Vec<BytePoint> = Vec::with_capacity(distinct);
        let mut previous: Option<u32> = None;
        for &raw in &keys {
            if previous == Some(raw) {
                if let Some(last) = points.last_mut() {
                    last.duplicate_count += 1;
                }
                continue;
            }
            points.push(BytePoint::new(TripletKey::from_raw(raw), points.len()));
            previous = Some(raw);
        }
        drop(keys);

        log::debug!(
            "built {} unique points from {} triplets ({} trailing bytes dropped)",
            points.len(),
            triplet_count,
            dropped_bytes
        );

        Ok(ByteCloud {
            points,
            triplet_count,
            dropped_bytes,
        })
    }

    /// Pack and sort the keys of a buffer whose length is a multiple of three
    fn sorted_keys(&self, bytes: &[u8]) -> Vec<u32> {
        #[cfg(feature = "parallel")]
        {
            if bytes.len() / TRIPLET_LEN >= self.parallel_threshold {
                use rayon::prelude::*;

                let mut keys: Vec<u32> = bytes
                    .par_chunks_exact(TRIPLET_LEN)
                    .map(pack_chunk)
                    .collect();
                keys.par_sort_unstable();
                return keys;
            }
        }

        let mut keys: Vec<u32> = bytes.chunks_exact(TRIPLET_LEN).map(pack_chunk).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for PointCloudBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of distinct values in an ascending slice
fn distinct_sorted(keys: &[u32]) -> usize {
    match keys.first() {
        Some(_) => 1 + keys.windows(2).filter(|w| w[0] != w[1]).count(),
        None => 0,
    }
}

#[inline]
fn pack_chunk(chunk: &[u8]) -> u32 {
    TripletKey::pack([chunk[0], chunk[1], chunk[2]]).raw()
}

/// Build a cloud from `bytes` with default settings
pub fn build_point_cloud(bytes: &[u8]) -> Result<ByteCloud> {
    PointCloudBuilder::new().build(bytes)
}
