//! Parallax Training Crate
//!
//! Streaming example assembly for training view-synthesis models. Shards of
//! raw scene recordings (decoded by parallax-data) are turned into
//! per-scene examples: canonical cameras, a context/target view split, a
//! baseline-normalized world, and batched images/depths/bounds.
//!
//! ## Modules
//!
//! - [`geometry`]: camera reconstruction from both raw encodings
//! - [`dataset`]: selection, normalization, assembly, and iteration
//! - [`error`]: fatal vs. per-scene recoverable error taxonomy

pub mod dataset;
pub mod error;
pub mod geometry;

pub use dataset::{
    Dataset, DatasetCfg, Example, ExampleShim, Examples, FrameData, ResolvedBounds, Stage,
    ViewGroup, ViewSelector, ViewSplit, WorkerInfo,
};
pub use error::{DatasetError, SelectionError};
