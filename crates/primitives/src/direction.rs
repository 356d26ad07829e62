use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six faces of a block.
///
/// Used as the "side" context of sided lookups: the face through which a
/// neighbour is accessing the queried block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	Down,
	Up,
	North,
	South,
	West,
	East,
}

/// Returned when a direction name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction: {0:?}")]
pub struct DirectionParseError(pub String);

impl Direction {
	/// All directions in index order.
	pub const ALL: [Direction; 6] = [
		Direction::Down,
		Direction::Up,
		Direction::North,
		Direction::South,
		Direction::West,
		Direction::East,
	];

	pub const fn opposite(self) -> Self {
		match self {
			Self::Down => Self::Up,
			Self::Up => Self::Down,
			Self::North => Self::South,
			Self::South => Self::North,
			Self::West => Self::East,
			Self::East => Self::West,
		}
	}

	/// Unit step `(dx, dy, dz)` towards this face.
	pub const fn offset(self) -> (i32, i32, i32) {
		match self {
			Self::Down => (0, -1, 0),
			Self::Up => (0, 1, 0),
			Self::North => (0, 0, -1),
			Self::South => (0, 0, 1),
			Self::West => (-1, 0, 0),
			Self::East => (1, 0, 0),
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::Down => "down",
			Self::Up => "up",
			Self::North => "north",
			Self::South => "south",
			Self::West => "west",
			Self::East => "east",
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Direction {
	type Err = DirectionParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|d| d.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| DirectionParseError(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("down", Direction::Down)]
	#[case("UP", Direction::Up)]
	#[case(" North ", Direction::North)]
	#[case("east", Direction::East)]
	fn parses_names_case_insensitively(#[case] input: &str, #[case] expected: Direction) {
		assert_eq!(input.parse::<Direction>(), Ok(expected));
	}

	#[test]
	fn rejects_unknown_names() {
		let err = "sideways".parse::<Direction>().unwrap_err();
		assert_eq!(err.to_string(), "unknown direction: \"sideways\"");
	}

	#[test]
	fn serializes_as_lowercase_name() {
		assert_eq!(serde_json::to_string(&Direction::North).unwrap(), r#""north""#);
		assert_eq!(serde_json::from_str::<Direction>(r#""west""#).unwrap(), Direction::West);
		assert!(serde_json::from_str::<Direction>(r#""West""#).is_err());
	}

	#[test]
	fn opposite_is_an_involution_and_offsets_cancel() {
		for d in Direction::ALL {
			assert_eq!(d.opposite().opposite(), d);
			let (x, y, z) = d.offset();
			let (ox, oy, oz) = d.opposite().offset();
			assert_eq!((x + ox, y + oy, z + oz), (0, 0, 0));
		}
	}
}
