use std::fmt;

use crate::{BlockEntity, BlockPos, BlockState, DimensionId, World};

/// Read-only metadata for one lookup invocation.
///
/// Borrowed from the caller for the duration of the query; nothing holding a
/// `QueryMeta` can outlive the lookup that produced it.
#[derive(Clone, Copy)]
pub struct QueryMeta<'a> {
	pub world: &'a dyn World,
	pub pos: BlockPos,
	pub state: &'a BlockState,
	pub entity: Option<&'a BlockEntity>,
}

impl<'a> QueryMeta<'a> {
	pub fn new(
		world: &'a dyn World,
		pos: BlockPos,
		state: &'a BlockState,
		entity: Option<&'a BlockEntity>,
	) -> Self {
		Self {
			world,
			pos,
			state,
			entity,
		}
	}

	pub fn dimension(&self) -> &'a DimensionId {
		let world: &'a dyn World = self.world;
		world.dimension()
	}
}

impl fmt::Debug for QueryMeta<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueryMeta")
			.field("dimension", self.world.dimension())
			.field("pos", &self.pos)
			.field("state", self.state)
			.field("entity", &self.entity)
			.finish()
	}
}
