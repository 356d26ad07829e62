//! Wrapper chains for block capability lookups.
//!
//! A lookup maps a world position and a context value to at most one
//! capability object. Extensions that do not know about each other can each
//! register a wrapper that decorates or replaces that object; the chain runs
//! them in registration order before the result reaches the caller.
//!
//! # Mental Model
//!
//! 1. **Identity:** every `(A, C)` pair of capability and context type owns one
//!    [`WrapperChain`], held by a [`WrapperRegistry`].
//! 2. **Loading phase:** extensions call [`WrapperRegistry::register`]. Each
//!    registration publishes a fresh snapshot of the chain.
//! 3. **Query phase:** [`BlockApiLookup::find`] asks the underlying
//!    [`CapabilityProvider`] and folds the result through the current
//!    snapshot. An absent result skips every wrapper.
//!
//! # Invariants
//!
//! - Registration order is application order. Wrappers are never removed,
//!   reordered or deduplicated.
//! - Wrappers never see an absent capability.
//! - A failing wrapper stops the fold; later wrappers do not run and the
//!   partial value is discarded.

mod chain;
mod config;
mod error;
mod gate;
mod lookup;
pub mod recorder;
mod registry;

pub use blockcap_primitives::{
	BlockEntity, BlockPos, BlockState, DimensionId, Direction, QueryMeta, World,
};
pub use chain::{Wrapper, WrapperChain};
pub use config::{ChainConfig, LateRegistration};
pub use error::{BoxError, ChainError, ConfigError, RegisterError};
pub use lookup::{BlockApiLookup, CapabilityProvider};
pub use registry::{
	LookupIdentity, WrapperRegistry, global, install_global, register_fallible_wrapper,
	register_wrapper,
};
