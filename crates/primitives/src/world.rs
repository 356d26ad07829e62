use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::BlockPos;

/// Identifier of a world dimension, e.g. `overworld` or `the_nether`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(Arc<str>);

impl DimensionId {
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for DimensionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for DimensionId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

/// The world a lookup runs against.
///
/// Owned by the host; lookups and wrappers only read from it.
pub trait World: Send + Sync {
	fn dimension(&self) -> &DimensionId;
}

impl World for DimensionId {
	fn dimension(&self) -> &DimensionId {
		self
	}
}

/// Block state at a queried position: the block id plus its properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockState {
	block: Arc<str>,
	/// Kept sorted by key.
	properties: Vec<(Arc<str>, Arc<str>)>,
}

impl BlockState {
	pub fn new(block: impl Into<Arc<str>>) -> Self {
		Self {
			block: block.into(),
			properties: Vec::new(),
		}
	}

	/// Sets `key` to `value`, replacing any previous value.
	pub fn with_property(mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
		let key = key.into();
		let value = value.into();
		match self.properties.binary_search_by(|(k, _)| <str as Ord>::cmp(k, &key)) {
			Ok(i) => self.properties[i].1 = value,
			Err(i) => self.properties.insert(i, (key, value)),
		}
		self
	}

	pub fn block(&self) -> &str {
		&self.block
	}

	pub fn property(&self, key: &str) -> Option<&str> {
		self.properties
			.binary_search_by(|(k, _)| <str as Ord>::cmp(k, key))
			.ok()
			.map(|i| self.properties[i].1.as_ref())
	}

	pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
		self.properties.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
	}
}

/// Opaque handle to the block entity at a position, if the block has one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockEntity {
	kind: Arc<str>,
	pos: BlockPos,
}

impl BlockEntity {
	pub fn new(kind: impl Into<Arc<str>>, pos: BlockPos) -> Self {
		Self {
			kind: kind.into(),
			pos,
		}
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn pos(&self) -> BlockPos {
		self.pos
	}
}
