//! Parallax Data Crate
//!
//! Shard loading and decoding for multi-view scene recordings. This crate is
//! geometry-agnostic: it turns on-disk shard files into typed in-memory
//! records and merges per-root scene indices. Camera reconstruction and
//! example assembly live in parallax-train.

pub mod chunk;
pub mod error;
pub mod index;
pub mod types;

pub use chunk::{ChunkFormat, decode_direction_chunk, decode_record_chunk, load_shard, TILE};
pub use error::DataError;
pub use index::load_scene_index;
pub use types::{DirectionArrays, DirectionChunk, SceneRecord, Shard};
