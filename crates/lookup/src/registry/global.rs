//! Process-wide registry for extensions loaded without a shared handle.

use std::sync::OnceLock;

use blockcap_primitives::QueryMeta;
use tracing::info;

use super::WrapperRegistry;
use crate::config::ChainConfig;
use crate::error::{BoxError, ConfigError, RegisterError};

static GLOBAL: OnceLock<WrapperRegistry> = OnceLock::new();

/// The process-wide registry, created with default settings on first access.
pub fn global() -> &'static WrapperRegistry {
	GLOBAL.get_or_init(WrapperRegistry::new)
}

/// Creates the process-wide registry with `config`.
///
/// Must run before anything touches [`global`]; afterwards the existing
/// registry is kept and [`ConfigError::AlreadyInstalled`] is returned.
pub fn install_global(config: ChainConfig) -> Result<&'static WrapperRegistry, ConfigError> {
	let mut installed = false;
	let registry = GLOBAL.get_or_init(|| {
		installed = true;
		WrapperRegistry::with_config(config)
	});
	if !installed {
		return Err(ConfigError::AlreadyInstalled);
	}
	info!(config = ?registry.config(), "installed global wrapper registry");
	Ok(registry)
}

/// Registers an infallible wrapper on the process-wide registry.
pub fn register_wrapper<A, C, F>(name: &str, func: F) -> Result<usize, RegisterError>
where
	A: 'static,
	C: 'static,
	F: Fn(A, &QueryMeta<'_>, &C) -> A + Send + Sync + 'static,
{
	global().register(name, func)
}

/// Registers a fallible wrapper on the process-wide registry.
pub fn register_fallible_wrapper<A, C, F>(name: &str, func: F) -> Result<usize, RegisterError>
where
	A: 'static,
	C: 'static,
	F: Fn(A, &QueryMeta<'_>, &C) -> Result<A, BoxError> + Send + Sync + 'static,
{
	global().register_fallible(name, func)
}
