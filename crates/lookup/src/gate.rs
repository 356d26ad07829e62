//! Loading-phase / query-phase split shared by every chain of a registry.
//!
//! Admission hands out a read guard that the caller holds until its snapshot
//! is published; [`RegistrationGate::seal`] takes the write side. A
//! registration is therefore either published before the seal returns or
//! judged against the sealed state, never both.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::warn;

use crate::config::LateRegistration;
use crate::error::RegisterError;

#[derive(Debug, Default)]
pub(crate) struct RegistrationGate {
	sealed: RwLock<bool>,
	late: LateRegistration,
}

/// Proof of admission; keeps the gate from sealing while held.
pub(crate) type Admission<'a> = RwLockReadGuard<'a, bool>;

impl RegistrationGate {
	pub(crate) fn new(late: LateRegistration) -> Self {
		Self {
			sealed: RwLock::new(false),
			late,
		}
	}

	/// Returns `true` if this call performed the transition.
	pub(crate) fn seal(&self) -> bool {
		let mut sealed = self.sealed.write();
		!std::mem::replace(&mut *sealed, true)
	}

	pub(crate) fn is_sealed(&self) -> bool {
		*self.sealed.read()
	}

	/// Must not be called while the same thread already holds an [`Admission`].
	pub(crate) fn admit(&self, chain: &Arc<str>, name: &str) -> Result<Admission<'_>, RegisterError> {
		let admission = self.sealed.read();
		if !*admission {
			return Ok(admission);
		}
		match self.late {
			LateRegistration::Allow => Ok(admission),
			LateRegistration::Warn => {
				warn!(chain = %chain, wrapper = name, "wrapper registered after query phase began");
				Ok(admission)
			}
			LateRegistration::Deny => Err(RegisterError::Sealed {
				chain: Arc::clone(chain),
				name: name.into(),
			}),
		}
	}
}
