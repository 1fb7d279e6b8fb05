//! Example assembly
//!
//! Gathers per-index frame data into the batched context/target groups that
//! cross the core's output boundary. Pure gather: no I/O, no mutation of
//! the inputs.

use glam::{Mat3, Mat4};
use ndarray::Array3;

use crate::dataset::config::ResolvedBounds;
use crate::dataset::selector::ViewSplit;

/// Dense per-frame data fetched for one selected view. Arrays are
/// `(height, width, channels)`.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub image: Array3<f32>,
    pub depth: Array3<f32>,
    pub position: Option<Array3<f32>>,
}

/// One batched view group. All per-view sequences are parallel and equal in
/// length; `positions` is present only for the direction-encoded format.
#[derive(Debug, Clone)]
pub struct ViewGroup {
    pub extrinsics: Vec<Mat4>,
    pub intrinsics: Vec<Mat3>,
    pub images: Vec<Array3<f32>>,
    pub depths: Vec<Array3<f32>>,
    pub positions: Option<Vec<Array3<f32>>>,
    pub near: Vec<f32>,
    pub far: Vec<f32>,
    /// Original frame indices within the scene.
    pub indices: Vec<usize>,
}

impl ViewGroup {
    /// Number of views in this group.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The self-contained per-scene unit yielded by the pipeline. Constructed
/// fresh per scene and handed to the augmentation/crop collaborators before
/// reaching the caller.
#[derive(Debug, Clone)]
pub struct Example {
    pub context: ViewGroup,
    pub target: ViewGroup,
    pub scene: String,
}

/// External collaborator applied to an assembled example: augmentation in
/// the training stage, crop/resize always. Pure transform by contract.
pub trait ExampleShim {
    fn apply(&self, example: Example) -> Example;
}

/// Gather the selected views into context and target groups.
///
/// `fetch` supplies the dense data for one frame index; it is invoked once
/// per occurrence of an index in the split. Near/far are broadcast per view
/// from the resolved bounds, divided by `nf_scale` so they track the
/// baseline-rescaled world.
pub fn assemble<F>(
    scene: &str,
    extrinsics: &[Mat4],
    intrinsics: &[Mat3],
    split: &ViewSplit,
    bounds: ResolvedBounds,
    nf_scale: f32,
    mut fetch: F,
) -> Example
where
    F: FnMut(usize) -> FrameData,
{
    Example {
        context: gather(&split.context, extrinsics, intrinsics, bounds, nf_scale, &mut fetch),
        target: gather(&split.target, extrinsics, intrinsics, bounds, nf_scale, &mut fetch),
        scene: scene.to_owned(),
    }
}

fn gather<F>(
    indices: &[usize],
    extrinsics: &[Mat4],
    intrinsics: &[Mat3],
    bounds: ResolvedBounds,
    nf_scale: f32,
    fetch: &mut F,
) -> ViewGroup
where
    F: FnMut(usize) -> FrameData,
{
    let n = indices.len();
    let mut images = Vec::with_capacity(n);
    let mut depths = Vec::with_capacity(n);
    let mut positions = Vec::with_capacity(n);
    let mut has_positions = true;

    for &i in indices {
        let frame = fetch(i);
        images.push(frame.image);
        depths.push(frame.depth);
        match frame.position {
            Some(p) => positions.push(p),
            None => has_positions = false,
        }
    }

    ViewGroup {
        extrinsics: indices.iter().map(|&i| extrinsics[i]).collect(),
        intrinsics: indices.iter().map(|&i| intrinsics[i]).collect(),
        images,
        depths,
        positions: has_positions.then_some(positions),
        near: vec![bounds.near / nf_scale; n],
        far: vec![bounds.far / nf_scale; n],
        indices: indices.to_vec(),
    }
}
