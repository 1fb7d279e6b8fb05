//! Error types for dataset construction and iteration

use parallax_data::DataError;

/// Per-scene recoverable conditions.
///
/// These are caught at the scene-processing boundary, logged, and converted
/// into "produce nothing for this scene"; they never abort a pass.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("not enough usable frames ({available} available, {required} required)")]
    InsufficientFrames { available: usize, required: usize },
    #[error("view index {index} out of range for {frames} frames")]
    IndexOutOfRange { index: usize, frames: usize },
    #[error("field of view {fov:.1} deg exceeds cap {max:.1} deg")]
    FovTooWide { fov: f32, max: f32 },
    #[error("insufficient context baseline {baseline:.6}")]
    InsufficientBaseline { baseline: f32 },
    #[error("decoded image shape {got:?} does not match expected {expected:?}")]
    BadImageShape {
        got: (usize, usize),
        expected: (usize, usize),
    },
}

/// Fatal dataset errors: misconfiguration or a corrupt dataset build.
///
/// Raised from construction or shard decoding; iteration stops after
/// yielding one of these.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("scene `{key}` not present in the index")]
    UnknownScene { key: String },
}
