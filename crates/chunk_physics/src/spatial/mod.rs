//! Spatial partitioning data structures
//!
//! A sparse grid of fixed-size chunks answers broad-phase queries; only
//! occupied chunks exist in memory.

mod chunk_index;
mod spatial_query;

pub use chunk_index::{ChunkCoord, ChunkIndex, ChunkRange};
pub use spatial_query::SpatialQuery;
