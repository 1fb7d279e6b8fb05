//! Scene index loading and merging.
//!
//! Each data root carries a per-stage `index.json` mapping scene keys to
//! shard paths relative to that stage directory. Roots are merged into one
//! map; a key appearing twice anywhere in the merge is a fatal configuration
//! error, never a silent overwrite.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::DataError;

/// Load and merge the scene indices of every root/stage combination.
///
/// Returned paths are absolute (root/stage/relative). Loading is eager; the
/// result is meant to be stored as an immutable field at dataset
/// construction time.
#[tracing::instrument(skip_all, fields(roots = roots.len()))]
pub fn load_scene_index(
    roots: &[PathBuf],
    stages: &[&str],
) -> Result<HashMap<String, PathBuf>, DataError> {
    let mut merged = HashMap::new();
    for stage in stages {
        for root in roots {
            let stage_dir = root.join(stage);
            let entries = read_index_file(&stage_dir.join("index.json"))?;
            for (key, relative) in entries {
                let path = stage_dir.join(relative);
                if merged.insert(key.clone(), path).is_some() {
                    return Err(DataError::DuplicateScene { key });
                }
            }
        }
    }
    info!(scenes = merged.len(), "merged scene index");
    Ok(merged)
}

fn read_index_file(path: &Path) -> Result<HashMap<String, String>, DataError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
