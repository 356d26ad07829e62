use std::sync::Arc;

use thiserror::Error;

/// Error raised by a fallible wrapper. The chain forwards it untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registration failures. Nothing is stored when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
	/// Wrapper names identify wrappers in logs and errors and must not be blank.
	#[error("wrapper name must not be blank")]
	InvalidName,

	/// The registry is sealed and configured to deny late registration.
	#[error("chain {chain} is sealed; late registration of {name:?} denied")]
	Sealed { chain: Arc<str>, name: Box<str> },
}

/// Failure while applying a chain to a present capability.
#[derive(Debug, Error)]
pub enum ChainError {
	/// A wrapper returned an error; wrappers after `index` were not invoked.
	#[error("wrapper {name:?} (#{index}) in chain {chain} failed: {source}")]
	Wrapper {
		chain: Arc<str>,
		index: usize,
		name: Box<str>,
		source: BoxError,
	},
}

impl ChainError {
	/// Position of the failing wrapper in its chain.
	pub fn index(&self) -> usize {
		match self {
			Self::Wrapper { index, .. } => *index,
		}
	}

	pub fn wrapper_name(&self) -> &str {
		match self {
			Self::Wrapper { name, .. } => name,
		}
	}
}

/// Errors that can occur while loading or installing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid chain configuration: {0}")]
	Parse(#[from] toml::de::Error),

	/// The process-wide registry already exists, with whatever configuration
	/// it was created with.
	#[error("global wrapper registry is already installed")]
	AlreadyInstalled,
}
