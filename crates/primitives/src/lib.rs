//! Core world vocabulary for capability lookups: positions, sides, block
//! states and the read-only metadata that accompanies a single query.

/// Block-face directions.
pub mod direction;
/// Integer block coordinates.
pub mod pos;
/// Per-query metadata handed to wrappers.
pub mod query;
/// World, block state and block entity handles.
pub mod world;

pub use direction::{Direction, DirectionParseError};
pub use pos::BlockPos;
pub use query::QueryMeta;
pub use world::{BlockEntity, BlockState, DimensionId, World};
