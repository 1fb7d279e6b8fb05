//! Error types for shard decoding and index loading

use std::path::PathBuf;

/// Errors raised while loading shards or scene indices.
///
/// All of these indicate a corrupt or misconfigured dataset build and are
/// fatal: recoverable per-scene conditions are handled downstream and never
/// surface as a `DataError`.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Shard decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("Index parse error: {0}")]
    Index(#[from] serde_json::Error),
    #[error("Bad shard shape in {path}: {detail}")]
    BadChunkShape { path: PathBuf, detail: String },
    #[error("Unrecognized shard format: {path}")]
    UnknownFormat { path: PathBuf },
    #[error("Duplicate scene key `{key}` across data roots")]
    DuplicateScene { key: String },
}
