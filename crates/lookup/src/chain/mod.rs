//! Ordered wrapper sequence for one lookup identity.
//!
//! # Role
//!
//! Holds the wrappers registered for one `(A, C)` pair and folds present
//! lookup results through them.
//!
//! # Publication
//!
//! The sequence lives behind an [`ArcSwap`]. Registration clones the current
//! snapshot, appends, and publishes with a compare-and-swap retry loop, so
//! concurrent registrations never lose updates. [`WrapperChain::apply`] pins
//! one snapshot for the whole fold and holds no lock while foreign wrapper
//! code runs.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use blockcap_primitives::QueryMeta;
use tracing::{debug, trace, warn};

use crate::config::LateRegistration;
use crate::error::{BoxError, ChainError, RegisterError};
use crate::gate::RegistrationGate;

type WrapFn<A, C> = dyn Fn(A, &QueryMeta<'_>, &C) -> Result<A, BoxError> + Send + Sync;

/// A named transformation of a present capability.
pub struct Wrapper<A, C> {
	name: Box<str>,
	func: Box<WrapFn<A, C>>,
}

impl<A, C> Wrapper<A, C> {
	/// Fails with [`RegisterError::InvalidName`] if `name` is blank.
	pub fn new<F>(name: &str, func: F) -> Result<Self, RegisterError>
	where
		F: Fn(A, &QueryMeta<'_>, &C) -> Result<A, BoxError> + Send + Sync + 'static,
	{
		if name.trim().is_empty() {
			return Err(RegisterError::InvalidName);
		}
		Ok(Self {
			name: name.into(),
			func: Box::new(func),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl<A, C> fmt::Debug for Wrapper<A, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Wrapper").field("name", &self.name).finish_non_exhaustive()
	}
}

/// Append-only wrapper chain for one capability/context type pair.
pub struct WrapperChain<A, C> {
	label: Arc<str>,
	wrappers: ArcSwap<Vec<Arc<Wrapper<A, C>>>>,
	gate: Arc<RegistrationGate>,
	trace_apply: bool,
}

impl<A, C> WrapperChain<A, C> {
	/// Creates an empty, standalone chain. Standalone chains are never sealed.
	pub fn new(label: &str) -> Self {
		let gate = Arc::new(RegistrationGate::new(LateRegistration::Allow));
		Self::from_parts(label.into(), gate, false)
	}

	pub(crate) fn from_parts(label: Arc<str>, gate: Arc<RegistrationGate>, trace_apply: bool) -> Self {
		Self {
			label,
			wrappers: ArcSwap::from_pointee(Vec::new()),
			gate,
			trace_apply,
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Appends an infallible wrapper. Returns its position in the chain.
	pub fn register<F>(&self, name: &str, func: F) -> Result<usize, RegisterError>
	where
		F: Fn(A, &QueryMeta<'_>, &C) -> A + Send + Sync + 'static,
	{
		self.push(Wrapper::new(name, move |value, meta, context| {
			Ok(func(value, meta, context))
		})?)
	}

	/// Appends a wrapper whose errors abort [`apply`](Self::apply).
	pub fn register_fallible<F>(&self, name: &str, func: F) -> Result<usize, RegisterError>
	where
		F: Fn(A, &QueryMeta<'_>, &C) -> Result<A, BoxError> + Send + Sync + 'static,
	{
		self.push(Wrapper::new(name, func)?)
	}

	/// Appends an already-built wrapper.
	pub fn push(&self, wrapper: Wrapper<A, C>) -> Result<usize, RegisterError> {
		let admission = self.gate.admit(&self.label, wrapper.name())?;
		let index = self.publish(wrapper);
		drop(admission);
		Ok(index)
	}

	/// Appends without consulting the gate; the caller holds the admission.
	pub(crate) fn publish(&self, wrapper: Wrapper<A, C>) -> usize {
		let wrapper = Arc::new(wrapper);

		loop {
			let cur = self.wrappers.load_full();
			let mut next = Vec::with_capacity(cur.len() + 1);
			next.extend(cur.iter().cloned());
			next.push(Arc::clone(&wrapper));
			let index = next.len() - 1;

			let prev = self.wrappers.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				debug!(chain = %self.label, wrapper = wrapper.name(), index, "registered wrapper");
				return index;
			}
			// CAS failed, retry against the newer snapshot
		}
	}

	/// Folds `raw` through every registered wrapper in registration order.
	///
	/// An absent `raw` is returned as-is without touching the wrappers. With no
	/// wrappers registered this is the identity. The first wrapper error ends
	/// the fold and is returned; the partially wrapped value is dropped.
	pub fn apply(
		&self,
		raw: Option<A>,
		meta: &QueryMeta<'_>,
		context: &C,
	) -> Result<Option<A>, ChainError> {
		let Some(mut value) = raw else {
			if self.trace_apply {
				trace!(chain = %self.label, pos = %meta.pos, "no capability; wrappers skipped");
			}
			return Ok(None);
		};

		let wrappers = self.wrappers.load_full();
		for (index, wrapper) in wrappers.iter().enumerate() {
			if self.trace_apply {
				trace!(chain = %self.label, wrapper = wrapper.name(), index, pos = %meta.pos, "applying wrapper");
			}
			value = (wrapper.func)(value, meta, context).map_err(|source| {
				warn!(chain = %self.label, wrapper = wrapper.name(), index, error = %source, "wrapper failed");
				ChainError::Wrapper {
					chain: Arc::clone(&self.label),
					index,
					name: wrapper.name.clone(),
					source,
				}
			})?;
		}
		Ok(Some(value))
	}

	pub fn len(&self) -> usize {
		self.wrappers.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Wrapper names in application order.
	pub fn names(&self) -> Vec<String> {
		self.wrappers.load().iter().map(|w| w.name.to_string()).collect()
	}
}

impl<A, C> fmt::Debug for WrapperChain<A, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WrapperChain")
			.field("label", &self.label)
			.field("wrappers", &self.names())
			.finish()
	}
}
