//! Shard decoding for the two on-disk formats.
//!
//! Direction shards are a zstd-compressed bincode payload of four named
//! dense arrays at a fixed 256x256 tile size. Record shards are an
//! uncompressed bincode sequence of per-scene records. Shape violations are
//! fatal here: they indicate a corrupt dataset build, not a skippable scene.

use std::fs;
use std::path::Path;

use ndarray::{Array4, s};
use tracing::debug;

use crate::error::DataError;
use crate::types::{DirectionArrays, DirectionChunk, SceneRecord, Shard};

/// Fixed tile resolution of the direction shard format.
pub const TILE: usize = 256;

/// On-disk shard format, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFormat {
    /// Zstd-compressed direction shard (`.zst`).
    DirectionZst,
    /// Generic record container (`.bin`).
    Records,
}

impl ChunkFormat {
    /// Infer the format from a shard path, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("zst") => Some(Self::DirectionZst),
            Some("bin") => Some(Self::Records),
            _ => None,
        }
    }
}

/// Load one shard, dispatching on its format.
pub fn load_shard(path: &Path) -> Result<Shard, DataError> {
    match ChunkFormat::from_path(path) {
        Some(ChunkFormat::DirectionZst) => Ok(Shard::Direction(decode_direction_chunk(path)?)),
        Some(ChunkFormat::Records) => Ok(Shard::Records(decode_record_chunk(path)?)),
        None => Err(DataError::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Decode a compressed direction shard into dense per-frame arrays.
///
/// The byte stream is decompressed, deserialized into the four named flat
/// arrays, and each is reshaped to `(n, 256, 256, c)`. Radiance is
/// normalized per channel by the chunk-wide channel maximum. The input file
/// is fully read and released before decoding starts.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn decode_direction_chunk(path: &Path) -> Result<DirectionChunk, DataError> {
    let compressed = fs::read(path)?;
    let bytes = zstd::decode_all(compressed.as_slice())?;
    let (raw, _): (DirectionArrays, usize) =
        bincode::decode_from_slice(&bytes, bincode::config::standard())?;

    let key = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let frames = frame_count(path, &raw)?;
    let mut images = reshape(path, "radiance", raw.radiance, frames, 3)?;
    let depths = reshape(path, "depth", raw.depth, frames, 1)?;
    let positions = reshape(path, "position", raw.position, frames, 3)?;
    let directions = reshape(path, "direction", raw.direction, frames, 3)?;

    // Normalize radiance by the per-channel maximum over the whole chunk.
    for c in 0..3 {
        let max = images
            .slice(s![.., .., .., c])
            .fold(f32::MIN, |m, &v| m.max(v));
        images.slice_mut(s![.., .., .., c]).mapv_inplace(|v| v / max);
    }

    debug!(frames, key = %key, "decoded direction chunk");
    Ok(DirectionChunk {
        key,
        images,
        depths,
        positions,
        directions,
    })
}

/// Frame count implied by the radiance array, validated against all four
/// arrays in [`reshape`].
fn frame_count(path: &Path, raw: &DirectionArrays) -> Result<usize, DataError> {
    let per_frame = TILE * TILE * 3;
    if raw.radiance.is_empty() || raw.radiance.len() % per_frame != 0 {
        return Err(DataError::BadChunkShape {
            path: path.to_path_buf(),
            detail: format!(
                "radiance has {} values, not a positive multiple of {}x{}x3",
                raw.radiance.len(),
                TILE,
                TILE
            ),
        });
    }
    Ok(raw.radiance.len() / per_frame)
}

fn reshape(
    path: &Path,
    name: &str,
    values: Vec<f32>,
    frames: usize,
    channels: usize,
) -> Result<Array4<f32>, DataError> {
    let expected = frames * TILE * TILE * channels;
    if values.len() != expected {
        return Err(DataError::BadChunkShape {
            path: path.to_path_buf(),
            detail: format!(
                "{name} has {} values, expected {expected} for {frames} frames",
                values.len()
            ),
        });
    }
    Array4::from_shape_vec((frames, TILE, TILE, channels), values).map_err(|e| {
        DataError::BadChunkShape {
            path: path.to_path_buf(),
            detail: format!("{name}: {e}"),
        }
    })
}

/// Decode a generic record shard into per-scene records.
///
/// No tile-size assumption is made; each record is only required to be
/// internally consistent (equal frame counts across fields, depth maps
/// matching the declared size).
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn decode_record_chunk(path: &Path) -> Result<Vec<SceneRecord>, DataError> {
    let bytes = fs::read(path)?;
    let (records, _): (Vec<SceneRecord>, usize) =
        bincode::decode_from_slice(&bytes, bincode::config::standard())?;

    for record in &records {
        let n = record.cameras.len();
        if record.images.len() != n || record.depths.len() != n {
            return Err(DataError::BadChunkShape {
                path: path.to_path_buf(),
                detail: format!(
                    "record `{}` has {} cameras, {} images, {} depths",
                    record.key,
                    n,
                    record.images.len(),
                    record.depths.len()
                ),
            });
        }
        let depth_len = (record.depth_size[0] * record.depth_size[1]) as usize;
        if let Some(bad) = record.depths.iter().position(|d| d.len() != depth_len) {
            return Err(DataError::BadChunkShape {
                path: path.to_path_buf(),
                detail: format!(
                    "record `{}` depth {bad} has {} values, expected {depth_len}",
                    record.key,
                    record.depths[bad].len()
                ),
            });
        }
    }

    debug!(scenes = records.len(), "decoded record chunk");
    Ok(records)
}
