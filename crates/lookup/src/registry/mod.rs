//! Owned mapping from lookup identity to wrapper chain.
//!
//! Each `(capability, context)` type pair gets exactly one [`WrapperChain`],
//! created empty the first time anything registers against it. Chains are
//! never removed.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use blockcap_primitives::QueryMeta;
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, info};

use crate::chain::{Wrapper, WrapperChain};
use crate::config::ChainConfig;
use crate::error::{BoxError, ChainError, RegisterError};
use crate::gate::RegistrationGate;

mod global;

pub use global::{global, install_global, register_fallible_wrapper, register_wrapper};

/// Type-level key of one independently chained lookup.
///
/// Equality and hashing only consider the two [`TypeId`]s; the names are
/// kept for display.
#[derive(Debug, Clone, Copy)]
pub struct LookupIdentity {
	capability: TypeId,
	context: TypeId,
	capability_name: &'static str,
	context_name: &'static str,
}

impl LookupIdentity {
	pub fn of<A: 'static, C: 'static>() -> Self {
		Self {
			capability: TypeId::of::<A>(),
			context: TypeId::of::<C>(),
			capability_name: type_name::<A>(),
			context_name: type_name::<C>(),
		}
	}

	pub fn capability_name(&self) -> &'static str {
		self.capability_name
	}

	pub fn context_name(&self) -> &'static str {
		self.context_name
	}
}

impl PartialEq for LookupIdentity {
	fn eq(&self, other: &Self) -> bool {
		self.capability == other.capability && self.context == other.context
	}
}

impl Eq for LookupIdentity {}

impl Hash for LookupIdentity {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.capability.hash(state);
		self.context.hash(state);
	}
}

impl fmt::Display for LookupIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.capability_name, self.context_name)
	}
}

type ErasedChain = Arc<dyn Any + Send + Sync>;

/// Registry of wrapper chains, one per [`LookupIdentity`].
pub struct WrapperRegistry {
	chains: RwLock<HashMap<LookupIdentity, ErasedChain>>,
	gate: Arc<RegistrationGate>,
	config: ChainConfig,
}

impl Default for WrapperRegistry {
	fn default() -> Self {
		Self::with_config(ChainConfig::default())
	}
}

impl WrapperRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: ChainConfig) -> Self {
		Self {
			chains: RwLock::new(HashMap::default()),
			gate: Arc::new(RegistrationGate::new(config.late_registration)),
			config,
		}
	}

	pub fn config(&self) -> &ChainConfig {
		&self.config
	}

	/// Returns the chain for `(A, C)`, creating it empty on first use.
	pub fn chain<A: 'static, C: 'static>(&self) -> Arc<WrapperChain<A, C>> {
		if let Some(chain) = self.existing::<A, C>() {
			return chain;
		}

		let identity = LookupIdentity::of::<A, C>();
		let mut chains = self.chains.write();
		let erased = chains.entry(identity).or_insert_with(|| {
			debug!(chain = %identity, "created wrapper chain");
			let chain: ErasedChain = Arc::new(WrapperChain::<A, C>::from_parts(
				identity.to_string().into(),
				Arc::clone(&self.gate),
				self.config.trace_apply,
			));
			chain
		});
		downcast(Arc::clone(erased))
	}

	/// Returns the chain for `(A, C)` only if one was already created.
	pub fn existing<A: 'static, C: 'static>(&self) -> Option<Arc<WrapperChain<A, C>>> {
		let chains = self.chains.read();
		chains
			.get(&LookupIdentity::of::<A, C>())
			.map(|erased| downcast(Arc::clone(erased)))
	}

	/// Appends an infallible wrapper to the `(A, C)` chain.
	pub fn register<A, C, F>(&self, name: &str, func: F) -> Result<usize, RegisterError>
	where
		A: 'static,
		C: 'static,
		F: Fn(A, &QueryMeta<'_>, &C) -> A + Send + Sync + 'static,
	{
		self.push(Wrapper::new(name, move |value, meta, context| {
			Ok(func(value, meta, context))
		})?)
	}

	/// Appends a fallible wrapper to the `(A, C)` chain.
	pub fn register_fallible<A, C, F>(&self, name: &str, func: F) -> Result<usize, RegisterError>
	where
		A: 'static,
		C: 'static,
		F: Fn(A, &QueryMeta<'_>, &C) -> Result<A, BoxError> + Send + Sync + 'static,
	{
		self.push(Wrapper::new(name, func)?)
	}

	/// Appends a built wrapper to the `(A, C)` chain.
	///
	/// The chain is only created once the wrapper has been admitted, so a
	/// rejected registration leaves the registry untouched.
	pub fn push<A: 'static, C: 'static>(&self, wrapper: Wrapper<A, C>) -> Result<usize, RegisterError> {
		let label: Arc<str> = LookupIdentity::of::<A, C>().to_string().into();
		let admission = self.gate.admit(&label, wrapper.name())?;
		let index = self.chain::<A, C>().publish(wrapper);
		drop(admission);
		Ok(index)
	}

	/// Applies the `(A, C)` chain; the identity if nothing was ever registered.
	///
	/// Never creates a chain.
	pub fn apply<A: 'static, C: 'static>(
		&self,
		raw: Option<A>,
		meta: &QueryMeta<'_>,
		context: &C,
	) -> Result<Option<A>, ChainError> {
		match self.existing::<A, C>() {
			Some(chain) => chain.apply(raw, meta, context),
			None => Ok(raw),
		}
	}

	/// Marks the end of the loading phase for every chain in this registry.
	///
	/// Later registrations follow [`ChainConfig::late_registration`].
	pub fn seal(&self) {
		if self.gate.seal() {
			info!(
				chains = self.chains.read().len(),
				policy = ?self.config.late_registration,
				"wrapper registration sealed"
			);
		}
	}

	pub fn is_sealed(&self) -> bool {
		self.gate.is_sealed()
	}

	/// Identities that have a chain, sorted by display name.
	pub fn identities(&self) -> Vec<LookupIdentity> {
		let mut ids: Vec<_> = self.chains.read().keys().copied().collect();
		ids.sort_by_key(|id| (id.capability_name, id.context_name));
		ids
	}
}

impl fmt::Debug for WrapperRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WrapperRegistry")
			.field("identities", &self.identities())
			.field("sealed", &self.is_sealed())
			.field("config", &self.config)
			.finish()
	}
}

fn downcast<A: 'static, C: 'static>(erased: ErasedChain) -> Arc<WrapperChain<A, C>> {
	match erased.downcast::<WrapperChain<A, C>>() {
		Ok(chain) => chain,
		Err(_) => unreachable!("chain stored under a mismatched lookup identity"),
	}
}
