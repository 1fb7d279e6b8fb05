//! Raw record types for the two shard formats.
//!
//! These are CPU-side representations shared across the parallax ecosystem.
//! Wire structs (`DirectionArrays`, `SceneRecord`) carry bincode derives and
//! mirror the on-disk layout; `DirectionChunk` is the reshaped, validated
//! form produced by the decoder.

use ndarray::{Array4, Axis};

/// Serialized payload of a compressed direction shard: four named flat
/// arrays covering every frame of one scene, in row-major
/// `(frame, row, col, channel)` order at a fixed 256x256 tile size.
#[derive(Debug, Clone, bincode::Encode, bincode::Decode)]
pub struct DirectionArrays {
    /// Linear radiance, 3 channels per pixel.
    pub radiance: Vec<f32>,
    /// Scene depth, 1 channel per pixel.
    pub depth: Vec<f32>,
    /// World-space surface position, 3 channels per pixel.
    pub position: Vec<f32>,
    /// Outgoing direction at each pixel, 3 channels per pixel.
    pub direction: Vec<f32>,
}

/// One scene entry of a generic record shard: encoded still images plus a
/// flat depth map and an 18-value pose vector per frame.
#[derive(Debug, Clone, bincode::Encode, bincode::Decode)]
pub struct SceneRecord {
    /// Unique scene key.
    pub key: String,
    /// Per-frame pose vectors: 4 intrinsic scalars (fx, fy, cx, cy), two
    /// unused slots, then a row-major 3x4 extrinsic block.
    pub cameras: Vec<[f32; 18]>,
    /// Per-frame encoded image bytes (e.g. PNG or JPEG).
    pub images: Vec<Vec<u8>>,
    /// Per-frame row-major depth values, `depth_size` each.
    pub depths: Vec<Vec<f32>>,
    /// Depth map dimensions as (height, width).
    pub depth_size: [u32; 2],
}

impl SceneRecord {
    /// Number of frames in this scene.
    pub fn frame_count(&self) -> usize {
        self.cameras.len()
    }
}

/// A decoded direction shard: one scene's frames reshaped into dense
/// `(frame, height, width, channel)` arrays.
#[derive(Debug, Clone)]
pub struct DirectionChunk {
    /// Scene key, derived from the shard file name.
    pub key: String,
    /// Radiance images, `(n, h, w, 3)`, normalized per channel by the
    /// chunk-wide channel maximum.
    pub images: Array4<f32>,
    /// Depth maps, `(n, h, w, 1)`.
    pub depths: Array4<f32>,
    /// World-space positions, `(n, h, w, 3)`.
    pub positions: Array4<f32>,
    /// Outgoing directions, `(n, h, w, 3)`.
    pub directions: Array4<f32>,
}

impl DirectionChunk {
    /// Number of frames in this chunk.
    pub fn frame_count(&self) -> usize {
        self.images.len_of(Axis(0))
    }

    /// Direction vector sampled at the principal pixel of frame `i`.
    ///
    /// The same sample serves as both the (negated) viewing axis and the
    /// camera center in the camera reconstruction.
    pub fn principal_direction(&self, i: usize) -> [f32; 3] {
        let h = self.directions.len_of(Axis(1));
        let w = self.directions.len_of(Axis(2));
        let (r, c) = (h / 2 - 1, w / 2 - 1);
        [
            self.directions[[i, r, c, 0]],
            self.directions[[i, r, c, 1]],
            self.directions[[i, r, c, 2]],
        ]
    }
}

/// A loaded shard: the unit of I/O and worker partitioning.
///
/// Owned exclusively by the iteration step processing it and dropped once
/// the scene(s) it holds have been emitted or skipped.
#[derive(Debug, Clone)]
pub enum Shard {
    /// One scene of direction-encoded frames.
    Direction(DirectionChunk),
    /// A sequence of pose-vector-encoded scene records.
    Records(Vec<SceneRecord>),
}
