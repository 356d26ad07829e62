//! Extensions register during loading, then many threads query.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use blockcap_lookup::recorder::{IoRecorderManager, ItemStorage, SharedStorage};
use blockcap_lookup::{
	BlockApiLookup, BlockPos, BlockState, BoxError, ChainConfig, ChainError, DimensionId,
	Direction, LateRegistration, QueryMeta, RegisterError, install_global,
	register_fallible_wrapper, register_wrapper,
};
use pretty_assertions::assert_eq;

struct Tank {
	capacity: u64,
	stored: AtomicUsize,
}

impl ItemStorage for Tank {
	fn insert(&self, _item: &str, max_amount: u64) -> u64 {
		let room = self.capacity - self.stored.load(Ordering::SeqCst) as u64;
		let moved = max_amount.min(room);
		self.stored.fetch_add(moved as usize, Ordering::SeqCst);
		moved
	}

	fn extract(&self, _item: &str, max_amount: u64) -> u64 {
		let held = self.stored.load(Ordering::SeqCst) as u64;
		let moved = max_amount.min(held);
		self.stored.fetch_sub(moved as usize, Ordering::SeqCst);
		moved
	}

	fn amount(&self, _item: &str) -> u64 {
		self.stored.load(Ordering::SeqCst) as u64
	}
}

/// Caps insertions at a fixed amount per call.
struct Throttled {
	inner: SharedStorage,
	limit: u64,
}

impl ItemStorage for Throttled {
	fn insert(&self, item: &str, max_amount: u64) -> u64 {
		self.inner.insert(item, max_amount.min(self.limit))
	}

	fn extract(&self, item: &str, max_amount: u64) -> u64 {
		self.inner.extract(item, max_amount)
	}

	fn amount(&self, item: &str) -> u64 {
		self.inner.amount(item)
	}
}

#[test]
fn extensions_load_then_queries_run_concurrently() {
	let registry = install_global(
		ChainConfig::from_toml_str(r#"late-registration = "deny""#).unwrap(),
	)
	.unwrap();

	// Extension A: throttles every storage.
	register_wrapper::<SharedStorage, Option<Direction>, _>("throttle", |storage, _, _| {
		Arc::new(Throttled {
			inner: storage,
			limit: 4,
		})
	})
	.unwrap();

	// Extension B: records transfers at observed positions.
	let recorders = Arc::new(IoRecorderManager::new());
	recorders.install(registry).unwrap();

	// Extension C: refuses storages inside blocks flagged as locked.
	register_fallible_wrapper::<SharedStorage, Option<Direction>, _>(
		"lock-check",
		|storage, meta: &QueryMeta<'_>, _| {
			if meta.state.property("locked") == Some("true") {
				return Err(BoxError::from("container is locked"));
			}
			Ok(storage)
		},
	)
	.unwrap();

	let lookup: BlockApiLookup<SharedStorage, Option<Direction>> = BlockApiLookup::new(
		"item-storage",
		|meta: &QueryMeta<'_>, _: &Option<Direction>| -> Option<SharedStorage> {
			(meta.state.block() == "tank").then(|| {
				Arc::new(Tank {
					capacity: 1_000_000,
					stored: AtomicUsize::new(0),
				}) as SharedStorage
			})
		},
		registry,
	);
	assert_eq!(lookup.chain().names(), vec!["throttle", "io-recorder", "lock-check"]);

	let world = DimensionId::from("overworld");
	let pos = BlockPos::new(0, 64, 0);
	let access = recorders.access(&world, pos);

	registry.seal();
	assert_eq!(
		register_wrapper::<SharedStorage, Option<Direction>, _>("too-late", |s, _, _| s),
		Err(RegisterError::Sealed {
			chain: lookup.chain().label().into(),
			name: "too-late".into(),
		})
	);

	const THREADS: usize = 4;
	const QUERIES: usize = 100;
	std::thread::scope(|s| {
		for _ in 0..THREADS {
			s.spawn(|| {
				let state = BlockState::new("tank");
				for _ in 0..QUERIES {
					let storage = lookup
						.find(&world, pos, &state, None, &Some(Direction::Up))
						.unwrap()
						.unwrap();
					// Throttle runs before the recorder, so only 4 of 10 are recorded.
					assert_eq!(storage.insert("water", 10), 4);
				}
			});
		}
	});
	assert_eq!(access.relative().inserted, (THREADS * QUERIES * 4) as u64);

	let locked = BlockState::new("tank").with_property("locked", "true");
	let Err(err) = lookup.find(&world, pos, &locked, None, &None) else {
		panic!("locked container should fail the query");
	};
	assert!(matches!(err, ChainError::Wrapper { index: 2, .. }));
	assert_eq!(err.wrapper_name(), "lock-check");

	let stone = BlockState::new("stone").with_property("locked", "true");
	assert!(lookup.find(&world, pos, &stone, None, &None).unwrap().is_none());

	assert!(matches!(
		ChainConfig::from_toml_str("late-registration = 3"),
		Err(blockcap_lookup::ConfigError::Parse(_))
	));
	assert_eq!(registry.config().late_registration, LateRegistration::Deny);
}
