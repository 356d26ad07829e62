//! Item transfer recording at observed block positions.
//!
//! [`IoRecorderManager::install`] registers a wrapper on the
//! `(SharedStorage, Option<Direction>)` chain. Whenever a storage lookup hits
//! an observed position, or is made from an observed neighbour, the returned
//! storage is wrapped in a [`RecordingStorage`] that counts what moves
//! through it. Lookups that touch nothing observed get the original storage
//! back untouched.

use std::collections::hash_map::Entry;
use std::ops::Sub;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use blockcap_primitives::{BlockPos, DimensionId, Direction, QueryMeta};
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

use crate::error::RegisterError;
use crate::registry::WrapperRegistry;

mod storage;

pub use storage::{ItemStorage, RecordingStorage, SharedStorage};

/// Name under which [`IoRecorderManager::install`] registers its wrapper.
pub const WRAPPER_NAME: &str = "io-recorder";

/// Point-in-time transfer totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoCounts {
	/// Items inserted into the observed block.
	pub inserted: u64,
	/// Items extracted from the observed block.
	pub extracted: u64,
	/// Items the observed block pushed into a neighbour.
	pub pushed: u64,
	/// Items the observed block pulled from a neighbour.
	pub pulled: u64,
}

impl Sub for IoCounts {
	type Output = IoCounts;

	fn sub(self, rhs: IoCounts) -> IoCounts {
		IoCounts {
			inserted: self.inserted.wrapping_sub(rhs.inserted),
			extracted: self.extracted.wrapping_sub(rhs.extracted),
			pushed: self.pushed.wrapping_sub(rhs.pushed),
			pulled: self.pulled.wrapping_sub(rhs.pulled),
		}
	}
}

/// Monotonic transfer counters for one block position.
#[derive(Debug)]
pub struct IoRecorder {
	usages: AtomicUsize,
	inserted: AtomicU64,
	extracted: AtomicU64,
	pushed: AtomicU64,
	pulled: AtomicU64,
}

impl IoRecorder {
	/// Starts with one usage, owned by the access that created it.
	fn new() -> Self {
		Self {
			usages: AtomicUsize::new(1),
			inserted: AtomicU64::new(0),
			extracted: AtomicU64::new(0),
			pushed: AtomicU64::new(0),
			pulled: AtomicU64::new(0),
		}
	}

	pub fn add_inserted(&self, count: u64) {
		self.inserted.fetch_add(count, Ordering::Relaxed);
	}

	pub fn add_extracted(&self, count: u64) {
		self.extracted.fetch_add(count, Ordering::Relaxed);
	}

	pub fn add_pushed(&self, count: u64) {
		self.pushed.fetch_add(count, Ordering::Relaxed);
	}

	pub fn add_pulled(&self, count: u64) {
		self.pulled.fetch_add(count, Ordering::Relaxed);
	}

	pub fn counts(&self) -> IoCounts {
		IoCounts {
			inserted: self.inserted.load(Ordering::Relaxed),
			extracted: self.extracted.load(Ordering::Relaxed),
			pushed: self.pushed.load(Ordering::Relaxed),
			pulled: self.pulled.load(Ordering::Relaxed),
		}
	}

	/// Number of open [`IoRecorderAccess`] handles.
	pub fn usages(&self) -> usize {
		self.usages.load(Ordering::Acquire)
	}
}

/// Handle onto an [`IoRecorder`] that remembers the totals at creation.
///
/// Holds one usage of the recorder until closed or dropped.
#[derive(Debug)]
pub struct IoRecorderAccess {
	recorder: Arc<IoRecorder>,
	offsets: IoCounts,
	closed: bool,
}

impl IoRecorderAccess {
	fn new(recorder: Arc<IoRecorder>, increment: bool) -> Self {
		if increment {
			recorder.usages.fetch_add(1, Ordering::AcqRel);
		}
		let offsets = recorder.counts();
		Self {
			recorder,
			offsets,
			closed: false,
		}
	}

	pub fn recorder(&self) -> &Arc<IoRecorder> {
		&self.recorder
	}

	/// Totals since the recorder was created.
	pub fn absolute(&self) -> IoCounts {
		self.recorder.counts()
	}

	/// Totals since this handle was created.
	pub fn relative(&self) -> IoCounts {
		self.recorder.counts() - self.offsets
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// Releases this handle's usage. Idempotent.
	pub fn close(&mut self) {
		if self.closed {
			return;
		}
		self.closed = true;
		self.recorder.usages.fetch_sub(1, Ordering::AcqRel);
	}
}

impl Drop for IoRecorderAccess {
	fn drop(&mut self) {
		self.close();
	}
}

type PositionMap = HashMap<i64, Arc<IoRecorder>>;

/// Observed positions, per dimension, keyed by packed [`BlockPos`].
#[derive(Debug, Default)]
pub struct IoRecorderManager {
	dimensions: RwLock<HashMap<DimensionId, PositionMap>>,
}

impl IoRecorderManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens an access handle for `pos`, starting to observe it if needed.
	pub fn access(&self, dimension: &DimensionId, pos: BlockPos) -> IoRecorderAccess {
		let key = pos.as_long();
		{
			let dims = self.dimensions.read();
			if let Some(existing) = dims.get(dimension).and_then(|p| p.get(&key)) {
				return IoRecorderAccess::new(Arc::clone(existing), true);
			}
		}

		let mut dims = self.dimensions.write();
		match dims.entry(dimension.clone()).or_default().entry(key) {
			Entry::Occupied(e) => IoRecorderAccess::new(Arc::clone(e.get()), true),
			Entry::Vacant(e) => {
				debug!(dimension = %dimension, pos = %pos, "observing item transfers");
				let recorder = Arc::new(IoRecorder::new());
				e.insert(Arc::clone(&recorder));
				IoRecorderAccess::new(recorder, false)
			}
		}
	}

	pub fn recorder(&self, dimension: &DimensionId, pos: BlockPos) -> Option<Arc<IoRecorder>> {
		self.dimensions
			.read()
			.get(dimension)
			.and_then(|p| p.get(&pos.as_long()))
			.cloned()
	}

	/// Wrapper body: decorates `storage` if the query touches an observed position.
	pub fn transform(
		&self,
		storage: SharedStorage,
		meta: &QueryMeta<'_>,
		side: &Option<Direction>,
	) -> SharedStorage {
		let (recorder, neighbor) = {
			let dims = self.dimensions.read();
			let Some(positions) = dims.get(meta.dimension()) else {
				return storage;
			};
			let recorder = positions.get(&meta.pos.as_long()).cloned();
			let neighbor = side.and_then(|s| positions.get(&meta.pos.relative(s).as_long()).cloned());
			(recorder, neighbor)
		};

		if recorder.is_none() && neighbor.is_none() {
			return storage;
		}
		Arc::new(RecordingStorage::new(storage, recorder, neighbor))
	}

	/// Stops observing positions whose every access handle was closed.
	///
	/// Returns the number of positions dropped.
	pub fn prune_unused(&self) -> usize {
		let mut dims = self.dimensions.write();
		let mut pruned = 0;
		for positions in dims.values_mut() {
			let before = positions.len();
			positions.retain(|_, r| r.usages() > 0);
			pruned += before - positions.len();
		}
		dims.retain(|_, positions| !positions.is_empty());
		if pruned > 0 {
			debug!(pruned, "pruned unused io recorders");
		}
		pruned
	}

	/// Registers [`transform`](Self::transform) on the item storage chain.
	pub fn install(self: &Arc<Self>, registry: &WrapperRegistry) -> Result<usize, RegisterError> {
		let manager = Arc::clone(self);
		registry.register::<SharedStorage, Option<Direction>, _>(
			WRAPPER_NAME,
			move |storage, meta, side| manager.transform(storage, meta, side),
		)
	}
}
