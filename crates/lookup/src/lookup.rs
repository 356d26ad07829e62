//! Query front that applies the wrapper chain transparently.

use std::fmt;
use std::sync::Arc;

use blockcap_primitives::{BlockEntity, BlockPos, BlockState, QueryMeta, World};

use crate::chain::WrapperChain;
use crate::error::{BoxError, ChainError, RegisterError};
use crate::registry::WrapperRegistry;

/// The underlying lookup: maps a query to at most one capability.
pub trait CapabilityProvider<A, C>: Send + Sync {
	fn find(&self, meta: &QueryMeta<'_>, context: &C) -> Option<A>;
}

impl<A, C, F> CapabilityProvider<A, C> for F
where
	F: Fn(&QueryMeta<'_>, &C) -> Option<A> + Send + Sync,
{
	fn find(&self, meta: &QueryMeta<'_>, context: &C) -> Option<A> {
		self(meta, context)
	}
}

/// A named capability lookup whose results pass through the `(A, C)` chain.
///
/// Lookups sharing capability and context types share one chain.
pub struct BlockApiLookup<A, C> {
	name: Arc<str>,
	provider: Box<dyn CapabilityProvider<A, C>>,
	chain: Arc<WrapperChain<A, C>>,
}

impl<A: 'static, C: 'static> BlockApiLookup<A, C> {
	pub fn new<P>(name: &str, provider: P, registry: &WrapperRegistry) -> Self
	where
		P: CapabilityProvider<A, C> + 'static,
	{
		Self {
			name: name.into(),
			provider: Box::new(provider),
			chain: registry.chain::<A, C>(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn chain(&self) -> &Arc<WrapperChain<A, C>> {
		&self.chain
	}

	pub fn register_wrapper<F>(&self, name: &str, func: F) -> Result<usize, RegisterError>
	where
		F: Fn(A, &QueryMeta<'_>, &C) -> A + Send + Sync + 'static,
	{
		self.chain.register(name, func)
	}

	pub fn register_fallible_wrapper<F>(&self, name: &str, func: F) -> Result<usize, RegisterError>
	where
		F: Fn(A, &QueryMeta<'_>, &C) -> Result<A, BoxError> + Send + Sync + 'static,
	{
		self.chain.register_fallible(name, func)
	}

	/// Runs the underlying lookup and returns its fully wrapped result.
	pub fn find(
		&self,
		world: &dyn World,
		pos: BlockPos,
		state: &BlockState,
		entity: Option<&BlockEntity>,
		context: &C,
	) -> Result<Option<A>, ChainError> {
		let meta = QueryMeta::new(world, pos, state, entity);
		let raw = self.provider.find(&meta, context);
		self.chain.apply(raw, &meta, context)
	}
}

impl<A, C> fmt::Debug for BlockApiLookup<A, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BlockApiLookup")
			.field("name", &self.name)
			.field("chain", &self.chain)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use blockcap_primitives::{DimensionId, Direction};
	use pretty_assertions::assert_eq;

	use super::*;

	#[derive(Debug, Clone, PartialEq)]
	struct Energy {
		capacity: u32,
		tags: Vec<&'static str>,
	}

	fn battery_provider(meta: &QueryMeta<'_>, side: &Option<Direction>) -> Option<Energy> {
		(meta.state.block() == "battery" && *side != Some(Direction::Up)).then(|| Energy {
			capacity: 1000,
			tags: Vec::new(),
		})
	}

	#[test]
	fn find_returns_wrapped_provider_result() {
		let registry = WrapperRegistry::new();
		let lookup: BlockApiLookup<Energy, Option<Direction>> =
			BlockApiLookup::new("energy", battery_provider, &registry);
		lookup
			.register_wrapper("double-capacity", |mut e: Energy, _, _| {
				e.capacity *= 2;
				e.tags.push("doubled");
				e
			})
			.unwrap();
		lookup
			.register_wrapper("side-tag", |mut e: Energy, _, side: &Option<Direction>| {
				e.tags.push(side.map_or("any", Direction::name));
				e
			})
			.unwrap();

		let world = DimensionId::from("overworld");
		let state = BlockState::new("battery");
		let found = lookup
			.find(&world, BlockPos::new(4, 5, 6), &state, None, &Some(Direction::North))
			.unwrap();
		assert_eq!(
			found,
			Some(Energy {
				capacity: 2000,
				tags: vec!["doubled", "north"],
			})
		);
	}

	#[test]
	fn absent_provider_result_bypasses_wrappers() {
		let registry = WrapperRegistry::new();
		let lookup: BlockApiLookup<Energy, Option<Direction>> =
			BlockApiLookup::new("energy", battery_provider, &registry);
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = Arc::clone(&calls);
		lookup
			.register_wrapper("count", move |e, _, _| {
				seen.fetch_add(1, Ordering::SeqCst);
				e
			})
			.unwrap();

		let world = DimensionId::from("overworld");
		let stone = BlockState::new("stone");
		let battery = BlockState::new("battery");
		assert_eq!(lookup.find(&world, BlockPos::ORIGIN, &stone, None, &None).unwrap(), None);
		assert_eq!(
			lookup
				.find(&world, BlockPos::ORIGIN, &battery, None, &Some(Direction::Up))
				.unwrap(),
			None
		);
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn lookups_with_the_same_types_share_a_chain() {
		let registry = WrapperRegistry::new();
		let first: BlockApiLookup<Energy, Option<Direction>> =
			BlockApiLookup::new("energy", battery_provider, &registry);
		let second = BlockApiLookup::new(
			"energy-fallback",
			|_: &QueryMeta<'_>, _: &Option<Direction>| {
				Some(Energy {
					capacity: 1,
					tags: Vec::new(),
				})
			},
			&registry,
		);
		registry
			.register::<Energy, Option<Direction>, _>("mark", |mut e, _, _| {
				e.tags.push("marked");
				e
			})
			.unwrap();

		assert!(Arc::ptr_eq(first.chain(), second.chain()));
		let world = DimensionId::from("overworld");
		let state = BlockState::new("dirt");
		let found = second.find(&world, BlockPos::ORIGIN, &state, None, &None).unwrap();
		assert_eq!(found.map(|e| e.tags), Some(vec!["marked"]));
		assert_eq!(second.name(), "energy-fallback");
	}
}
