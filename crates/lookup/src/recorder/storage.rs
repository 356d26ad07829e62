use std::fmt;
use std::sync::Arc;

use super::IoRecorder;

/// Item inventory capability, as exposed by item storage lookups.
///
/// Methods take `&self`; implementations synchronise internally so one
/// storage can be handed to many callers.
pub trait ItemStorage: Send + Sync {
	fn supports_insertion(&self) -> bool {
		true
	}

	fn supports_extraction(&self) -> bool {
		true
	}

	/// Inserts up to `max_amount` of `item`; returns how many were accepted.
	fn insert(&self, item: &str, max_amount: u64) -> u64;

	/// Extracts up to `max_amount` of `item`; returns how many were removed.
	fn extract(&self, item: &str, max_amount: u64) -> u64;

	fn amount(&self, item: &str) -> u64;
}

/// Capability type of item storage lookups.
pub type SharedStorage = Arc<dyn ItemStorage>;

/// Storage decorator that counts items moved through it.
///
/// `recorder` observes the queried position; `neighbor` observes the block on
/// the accessed side, which is the party pushing into or pulling from it.
pub struct RecordingStorage {
	inner: SharedStorage,
	recorder: Option<Arc<IoRecorder>>,
	neighbor: Option<Arc<IoRecorder>>,
}

impl RecordingStorage {
	pub fn new(
		inner: SharedStorage,
		recorder: Option<Arc<IoRecorder>>,
		neighbor: Option<Arc<IoRecorder>>,
	) -> Self {
		Self {
			inner,
			recorder,
			neighbor,
		}
	}
}

impl ItemStorage for RecordingStorage {
	fn supports_insertion(&self) -> bool {
		self.inner.supports_insertion()
	}

	fn supports_extraction(&self) -> bool {
		self.inner.supports_extraction()
	}

	fn insert(&self, item: &str, max_amount: u64) -> u64 {
		let moved = self.inner.insert(item, max_amount);
		if moved > 0 {
			if let Some(r) = &self.recorder {
				r.add_inserted(moved);
			}
			if let Some(n) = &self.neighbor {
				n.add_pushed(moved);
			}
		}
		moved
	}

	fn extract(&self, item: &str, max_amount: u64) -> u64 {
		let moved = self.inner.extract(item, max_amount);
		if moved > 0 {
			if let Some(r) = &self.recorder {
				r.add_extracted(moved);
			}
			if let Some(n) = &self.neighbor {
				n.add_pulled(moved);
			}
		}
		moved
	}

	fn amount(&self, item: &str) -> u64 {
		self.inner.amount(item)
	}
}

impl fmt::Debug for RecordingStorage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RecordingStorage")
			.field("recorder", &self.recorder)
			.field("neighbor", &self.neighbor)
			.finish_non_exhaustive()
	}
}
