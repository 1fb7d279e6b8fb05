//! Dataset configuration surface

use std::path::PathBuf;

use serde::Deserialize;

/// Pipeline stage the dataset is constructed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Train,
    Val,
    Test,
}

impl Stage {
    /// On-disk stage directory backing this stage. Validation reads from the
    /// test split, and overfitting always pins to the test split.
    pub fn data_stage(self, overfit: bool) -> &'static str {
        if overfit {
            return "test";
        }
        match self {
            Stage::Train => "train",
            Stage::Val | Stage::Test => "test",
        }
    }
}

/// Recognized dataset options.
///
/// Near/far use a -1 sentinel meaning "use the built-in default"; they are
/// resolved once at construction into [`ResolvedBounds`].
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetCfg {
    /// Data roots to merge. Scene keys must be unique across all of them.
    pub roots: Vec<PathBuf>,
    /// Minimum context baseline distance; scenes below it are skipped.
    pub baseline_epsilon: f32,
    /// Maximum per-frame field of view in degrees.
    pub max_fov_degrees: f32,
    /// Rescale the world so the two-view context baseline is exactly 1.
    pub make_baseline_one: bool,
    /// Apply the augmentation collaborator during training.
    pub augment: bool,
    /// Cap on reported test-stage length (0 = uncapped).
    #[serde(default)]
    pub test_len: usize,
    /// Keep every n-th chunk in the test stage (1 = all).
    #[serde(default = "default_one")]
    pub test_chunk_interval: usize,
    /// Emit each test-stage scene this many times, with a `_NN` key suffix
    /// when greater than 1.
    #[serde(default = "default_one")]
    pub test_times_per_scene: usize,
    /// Skip scenes whose decoded images do not match `expected_shape`.
    #[serde(default = "default_true")]
    pub skip_bad_shape: bool,
    /// Near bound; -1 selects the built-in default.
    #[serde(default = "default_bound")]
    pub near: f32,
    /// Far bound; -1 selects the built-in default.
    #[serde(default = "default_bound")]
    pub far: f32,
    /// Divide near/far by the baseline scale along with the geometry.
    #[serde(default = "default_true")]
    pub baseline_scale_bounds: bool,
    /// Shuffle chunks in the validation stage as well as training.
    #[serde(default = "default_true")]
    pub shuffle_val: bool,
    /// Repeat a single scene for overfitting runs.
    #[serde(default)]
    pub overfit_to_scene: Option<String>,
    /// Replace the policy's context indices with a fixed list. Diagnostic
    /// knob, off by default; out-of-range entries skip the scene.
    #[serde(default)]
    pub override_context_indices: Option<Vec<usize>>,
    /// Target (height, width) handed to the crop collaborator.
    pub image_shape: (usize, usize),
    /// Decoded (height, width) the record format is expected to produce.
    #[serde(default = "default_expected_shape")]
    pub expected_shape: (usize, usize),
}

fn default_one() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_bound() -> f32 {
    -1.0
}

fn default_expected_shape() -> (usize, usize) {
    (360, 640)
}

/// Near/far bounds with sentinels resolved, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBounds {
    pub near: f32,
    pub far: f32,
}

impl ResolvedBounds {
    const DEFAULT_NEAR: f32 = 0.1;
    const DEFAULT_FAR: f32 = 1000.0;

    /// Resolve the configured bounds, substituting the built-in defaults for
    /// the -1 sentinel.
    pub fn resolve(cfg: &DatasetCfg) -> Self {
        Self {
            near: if cfg.near == -1.0 {
                Self::DEFAULT_NEAR
            } else {
                cfg.near
            },
            far: if cfg.far == -1.0 {
                Self::DEFAULT_FAR
            } else {
                cfg.far
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cfg() -> DatasetCfg {
        DatasetCfg {
            roots: vec![],
            baseline_epsilon: 0.001,
            max_fov_degrees: 100.0,
            make_baseline_one: true,
            augment: false,
            test_len: 0,
            test_chunk_interval: 1,
            test_times_per_scene: 1,
            skip_bad_shape: true,
            near: -1.0,
            far: -1.0,
            baseline_scale_bounds: true,
            shuffle_val: true,
            overfit_to_scene: None,
            override_context_indices: None,
            image_shape: (256, 256),
            expected_shape: (360, 640),
        }
    }

    #[test]
    fn test_bounds_resolve_sentinel() {
        let bounds = ResolvedBounds::resolve(&base_cfg());
        assert_eq!(bounds.near, 0.1);
        assert_eq!(bounds.far, 1000.0);
    }

    #[test]
    fn test_bounds_resolve_explicit() {
        let mut cfg = base_cfg();
        cfg.near = 0.5;
        cfg.far = 20.0;
        let bounds = ResolvedBounds::resolve(&cfg);
        assert_eq!(bounds.near, 0.5);
        assert_eq!(bounds.far, 20.0);
    }

    #[test]
    fn test_data_stage_mapping() {
        assert_eq!(Stage::Train.data_stage(false), "train");
        assert_eq!(Stage::Val.data_stage(false), "test");
        assert_eq!(Stage::Test.data_stage(false), "test");
        assert_eq!(Stage::Train.data_stage(true), "test");
    }
}
