use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

const PACKED_XZ_BITS: u32 = 26;
const PACKED_Y_BITS: u32 = 12;
const XZ_MASK: i64 = (1 << PACKED_XZ_BITS) - 1;
const Y_MASK: i64 = (1 << PACKED_Y_BITS) - 1;
const Z_SHIFT: u32 = PACKED_Y_BITS;
const X_SHIFT: u32 = PACKED_Y_BITS + PACKED_XZ_BITS;

/// Integer coordinates of a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPos {
	pub x: i32,
	pub y: i32,
	pub z: i32,
}

impl BlockPos {
	pub const ORIGIN: BlockPos = BlockPos::new(0, 0, 0);

	pub const fn new(x: i32, y: i32, z: i32) -> Self {
		Self { x, y, z }
	}

	pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
		Self::new(
			self.x.wrapping_add(dx),
			self.y.wrapping_add(dy),
			self.z.wrapping_add(dz),
		)
	}

	/// The adjacent position across `side`.
	pub const fn relative(self, side: Direction) -> Self {
		let (dx, dy, dz) = side.offset();
		self.offset(dx, dy, dz)
	}

	/// The six adjacent positions, in [`Direction::ALL`] order.
	pub fn neighbors(self) -> [BlockPos; 6] {
		Direction::ALL.map(|d| self.relative(d))
	}

	/// Packs the position into a single `i64`.
	///
	/// Layout from the high bit down: 26 bits of x, 26 bits of z, 12 bits of
	/// y. Components outside that range wrap.
	pub const fn as_long(self) -> i64 {
		((self.x as i64 & XZ_MASK) << X_SHIFT)
			| ((self.z as i64 & XZ_MASK) << Z_SHIFT)
			| (self.y as i64 & Y_MASK)
	}

	/// Inverse of [`BlockPos::as_long`].
	pub const fn from_long(packed: i64) -> Self {
		let x = packed >> X_SHIFT;
		let z = (packed << PACKED_XZ_BITS) >> (64 - PACKED_XZ_BITS);
		let y = (packed << (64 - PACKED_Y_BITS)) >> (64 - PACKED_Y_BITS);
		Self::new(x as i32, y as i32, z as i32)
	}
}

impl fmt::Display for BlockPos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
	}
}

impl From<(i32, i32, i32)> for BlockPos {
	fn from((x, y, z): (i32, i32, i32)) -> Self {
		Self::new(x, y, z)
	}
}
