//! Streaming multi-view example dataset
//!
//! Pull-based producer over sharded scene recordings: each chunk is decoded,
//! cameras are reconstructed, a context/target split is selected, the world
//! is rescaled from the context baseline, and one self-contained example is
//! emitted per scene (or the scene is skipped). Scenes are processed
//! synchronously; intermediate tensors are owned by the iteration step and
//! dropped once the example is yielded or the scene is skipped.

pub mod assembler;
pub mod baseline;
pub mod config;
pub mod selector;
pub mod worker;

pub use assembler::{Example, ExampleShim, FrameData, ViewGroup, assemble};
pub use baseline::normalize_baseline;
pub use config::{DatasetCfg, ResolvedBounds, Stage};
pub use selector::{ViewSelector, ViewSplit, select_views};
pub use worker::{WorkerInfo, partition_chunks, shuffle_chunks};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};
use ndarray::{Array3, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use parallax_data::{
    ChunkFormat, DataError, DirectionChunk, SceneRecord, Shard, load_scene_index, load_shard,
};

use crate::error::{DatasetError, SelectionError};
use crate::geometry::{camera_from_direction, convert_pose, fixed_intrinsics};

/// A constructed dataset: immutable index, chunk list, and resolved
/// configuration. Examples are produced by [`Dataset::examples`].
pub struct Dataset {
    cfg: DatasetCfg,
    stage: Stage,
    selector: Box<dyn ViewSelector>,
    bounds: ResolvedBounds,
    index: HashMap<String, PathBuf>,
    chunks: Vec<PathBuf>,
    augment_shim: Option<Box<dyn ExampleShim>>,
    crop_shim: Option<Box<dyn ExampleShim>>,
}

impl Dataset {
    /// Build a dataset for one stage.
    ///
    /// Eagerly loads and merges every root's scene index (duplicate keys are
    /// fatal), collects the stage's chunk files, resolves the near/far
    /// sentinels, and applies the overfit substitution and test-stage chunk
    /// striding.
    pub fn new(
        cfg: DatasetCfg,
        stage: Stage,
        selector: Box<dyn ViewSelector>,
    ) -> Result<Self, DatasetError> {
        let overfit = cfg.overfit_to_scene.is_some();
        let data_stage = stage.data_stage(overfit);

        // Overfitting merges both splits so the pinned scene is found
        // regardless of which one holds it.
        let stages: &[&str] = if overfit {
            &["test", "train"]
        } else {
            &[data_stage]
        };
        let index = load_scene_index(&cfg.roots, stages)?;

        let mut chunks = Vec::new();
        for root in &cfg.roots {
            let mut root_chunks = collect_chunks(&root.join(data_stage))?;
            chunks.append(&mut root_chunks);
        }
        chunks.sort();

        if let Some(key) = &cfg.overfit_to_scene {
            let pinned = index
                .get(key)
                .cloned()
                .ok_or_else(|| DatasetError::UnknownScene { key: key.clone() })?;
            chunks = vec![pinned; chunks.len().max(1)];
        }

        if stage == Stage::Test && cfg.test_chunk_interval > 1 {
            chunks = chunks
                .into_iter()
                .step_by(cfg.test_chunk_interval)
                .collect();
        }

        let bounds = ResolvedBounds::resolve(&cfg);
        debug!(chunks = chunks.len(), scenes = index.len(), ?stage, "dataset ready");
        Ok(Self {
            cfg,
            stage,
            selector,
            bounds,
            index,
            chunks,
            augment_shim: None,
            crop_shim: None,
        })
    }

    /// Attach the augmentation collaborator, applied only in the training
    /// stage and only when augmentation is enabled.
    pub fn with_augmentation(mut self, shim: Box<dyn ExampleShim>) -> Self {
        self.augment_shim = Some(shim);
        self
    }

    /// Attach the crop/resize collaborator, applied to every example.
    ///
    /// The builder receives the configured target `(height, width)` so the
    /// collaborator crops to the shape this dataset was constructed with.
    pub fn with_crop<F>(mut self, build: F) -> Self
    where
        F: FnOnce((usize, usize)) -> Box<dyn ExampleShim>,
    {
        self.crop_shim = Some(build(self.cfg.image_shape));
        self
    }

    /// Number of examples one full pass yields, before per-scene skips.
    pub fn len(&self) -> usize {
        let times = self.cfg.test_times_per_scene.max(1);
        let n = self.index.len() * times;
        if self.stage == Stage::Test && self.cfg.test_len > 0 {
            n.min(self.cfg.test_len)
        } else {
            n
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved near/far bounds used for every emitted example.
    pub fn bounds(&self) -> ResolvedBounds {
        self.bounds
    }

    /// Start one pass over this worker's share of the chunks.
    ///
    /// `seed` drives the pass-local shuffle: reproducibility across passes
    /// is the caller's choice of seed. Partitioning happens on the collected
    /// chunk order before the shuffle, so workers own disjoint subsets even
    /// though each shuffles independently.
    pub fn examples(&self, seed: u64, worker: WorkerInfo) -> Examples<'_> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut chunks = partition_chunks(&self.chunks, worker);
        if self.shuffles() {
            shuffle_chunks(&mut chunks, &mut rng);
        }
        Examples {
            dataset: self,
            chunks: chunks.into_iter(),
            current: None,
            rng,
            finished: false,
        }
    }

    fn shuffles(&self) -> bool {
        match self.stage {
            Stage::Train => true,
            Stage::Val => self.cfg.shuffle_val,
            Stage::Test => false,
        }
    }

    /// Selection plus baseline normalization for one scene. `None` means
    /// the scene is skipped; the reason has already been logged.
    fn select_and_scale(
        &self,
        scene: &str,
        extrinsics: &mut [Mat4],
        intrinsics: &[Mat3],
    ) -> Option<(ViewSplit, f32)> {
        let split = match select_views(
            self.selector.as_ref(),
            scene,
            extrinsics,
            intrinsics,
            self.cfg.max_fov_degrees,
            self.cfg.override_context_indices.as_deref(),
        ) {
            Ok(split) => split,
            Err(reason) => {
                warn!(scene = %scene, %reason, "skipping scene");
                return None;
            }
        };

        let scale = match normalize_baseline(
            extrinsics,
            &split.context,
            self.cfg.make_baseline_one,
            self.cfg.baseline_epsilon,
        ) {
            Ok(scale) => scale,
            Err(reason) => {
                warn!(scene = %scene, %reason, "skipping scene");
                return None;
            }
        };

        let nf_scale = if self.cfg.baseline_scale_bounds {
            scale
        } else {
            1.0
        };
        Some((split, nf_scale))
    }

    /// Process the single scene of a direction chunk.
    fn process_direction(&self, chunk: &DirectionChunk) -> Option<Example> {
        let n = chunk.frame_count();
        let mut extrinsics = Vec::with_capacity(n);
        for i in 0..n {
            let d = Vec3::from_array(chunk.principal_direction(i));
            // Center and viewing axis both come from the principal sample.
            extrinsics.push(camera_from_direction(d, d).inverse());
        }
        let intrinsics = vec![fixed_intrinsics(); n];

        let (split, nf_scale) = self.select_and_scale(&chunk.key, &mut extrinsics, &intrinsics)?;

        let example = assemble(
            &chunk.key,
            &extrinsics,
            &intrinsics,
            &split,
            self.bounds,
            nf_scale,
            |i| FrameData {
                image: chunk.images.index_axis(Axis(0), i).to_owned(),
                depth: chunk.depths.index_axis(Axis(0), i).to_owned(),
                position: Some(chunk.positions.index_axis(Axis(0), i).to_owned()),
            },
        );
        Some(self.apply_shims(example))
    }

    /// Process one run of a pose-vector scene record. Only the selected
    /// frames are image-decoded.
    fn process_record(
        &self,
        record: &SceneRecord,
        rep: usize,
        times: usize,
    ) -> Result<Option<Example>, DatasetError> {
        let mut extrinsics = Vec::with_capacity(record.frame_count());
        let mut intrinsics = Vec::with_capacity(record.frame_count());
        for pose in &record.cameras {
            let (e, k) = convert_pose(pose);
            extrinsics.push(e);
            intrinsics.push(k);
        }

        let scene = if times > 1 {
            format!("{}_{rep:02}", record.key)
        } else {
            record.key.clone()
        };

        let Some((split, nf_scale)) = self.select_and_scale(&scene, &mut extrinsics, &intrinsics)
        else {
            return Ok(None);
        };

        let (dh, dw) = (record.depth_size[0] as usize, record.depth_size[1] as usize);
        let mut frames: HashMap<usize, FrameData> = HashMap::new();
        for &i in split.context.iter().chain(&split.target) {
            if frames.contains_key(&i) {
                continue;
            }
            let image = decode_image(&record.images[i])?;
            let got = (image.shape()[0], image.shape()[1]);
            if self.cfg.skip_bad_shape && got != self.cfg.expected_shape {
                let reason = SelectionError::BadImageShape {
                    got,
                    expected: self.cfg.expected_shape,
                };
                warn!(scene = %scene, %reason, "skipping scene");
                return Ok(None);
            }
            let depth = Array3::from_shape_vec((dh, dw, 1), record.depths[i].clone())
                .expect("depth length validated at decode");
            frames.insert(
                i,
                FrameData {
                    image,
                    depth,
                    position: None,
                },
            );
        }

        let example = assemble(
            &scene,
            &extrinsics,
            &intrinsics,
            &split,
            self.bounds,
            nf_scale,
            |i| frames[&i].clone(),
        );
        Ok(Some(self.apply_shims(example)))
    }

    fn apply_shims(&self, mut example: Example) -> Example {
        if self.stage == Stage::Train && self.cfg.augment {
            if let Some(shim) = &self.augment_shim {
                example = shim.apply(example);
            }
        }
        if let Some(shim) = &self.crop_shim {
            example = shim.apply(example);
        }
        example
    }
}

fn collect_chunks(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut chunks = Vec::new();
    for entry in fs::read_dir(dir).map_err(DataError::from)? {
        let path = entry.map_err(DataError::from)?.path();
        if ChunkFormat::from_path(&path).is_some() {
            chunks.push(path);
        }
    }
    Ok(chunks)
}

fn decode_image(bytes: &[u8]) -> Result<Array3<f32>, DatasetError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (w, h) = rgb.dimensions();
    let data = rgb
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();
    Ok(Array3::from_shape_vec((h as usize, w as usize, 3), data)
        .expect("RGB buffer length matches image dimensions"))
}

enum ChunkState {
    Direction(DirectionChunk),
    Records {
        records: Vec<SceneRecord>,
        run: usize,
        times: usize,
    },
}

/// One pass of examples over a worker's chunk share.
///
/// Per-scene recoverable failures are logged and skipped; a fatal error
/// (corrupt shard, failed image decode) is yielded once and ends the pass.
/// Dropping the iterator releases the currently open shard; no other
/// cleanup is required.
pub struct Examples<'a> {
    dataset: &'a Dataset,
    chunks: std::vec::IntoIter<PathBuf>,
    current: Option<ChunkState>,
    rng: StdRng,
    finished: bool,
}

impl Examples<'_> {
    fn load_chunk(&mut self, path: &Path) -> Result<Option<ChunkState>, DatasetError> {
        match load_shard(path)? {
            Shard::Direction(chunk) => Ok(Some(ChunkState::Direction(chunk))),
            Shard::Records(mut records) => {
                if let Some(key) = &self.dataset.cfg.overfit_to_scene {
                    let pinned = records
                        .iter()
                        .find(|r| &r.key == key)
                        .cloned()
                        .ok_or_else(|| DatasetError::UnknownScene { key: key.clone() })?;
                    let len = records.len();
                    records = vec![pinned; len];
                }
                if self.dataset.shuffles() {
                    records.shuffle(&mut self.rng);
                }
                if records.is_empty() {
                    return Ok(None);
                }
                let times = self.dataset.cfg.test_times_per_scene.max(1);
                Ok(Some(ChunkState::Records {
                    records,
                    run: 0,
                    times,
                }))
            }
        }
    }
}

impl Iterator for Examples<'_> {
    type Item = Result<Example, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let state = match self.current.take() {
                Some(state) => state,
                None => {
                    let path = self.chunks.next()?;
                    match self.load_chunk(&path) {
                        Ok(Some(state)) => state,
                        Ok(None) => continue,
                        Err(e) => {
                            self.finished = true;
                            return Some(Err(e));
                        }
                    }
                }
            };

            match state {
                ChunkState::Direction(chunk) => match self.dataset.process_direction(&chunk) {
                    Some(example) => return Some(Ok(example)),
                    None => continue,
                },
                ChunkState::Records {
                    records,
                    run,
                    times,
                } => {
                    let result = self.dataset.process_record(&records[run / times], run % times, times);
                    if run + 1 < records.len() * times {
                        self.current = Some(ChunkState::Records {
                            records,
                            run: run + 1,
                            times,
                        });
                    }
                    match result {
                        Ok(Some(example)) => return Some(Ok(example)),
                        Ok(None) => continue,
                        Err(e) => {
                            self.finished = true;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}
