use serde::Deserialize;

use crate::error::ConfigError;

/// What happens to registrations that arrive after [`seal`](crate::WrapperRegistry::seal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateRegistration {
	/// Accept silently.
	Allow,
	/// Accept and log a warning.
	#[default]
	Warn,
	/// Reject with [`RegisterError::Sealed`](crate::RegisterError::Sealed).
	Deny,
}

/// Registry-wide chain settings.
///
/// ```toml
/// late-registration = "deny"
/// trace-apply = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ChainConfig {
	pub late_registration: LateRegistration,
	/// Emit a `trace` event per short-circuit and per wrapper invocation.
	pub trace_apply: bool,
}

impl ChainConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = ChainConfig::from_toml_str("").unwrap();
		assert_eq!(config, ChainConfig::default());
		assert_eq!(config.late_registration, LateRegistration::Warn);
		assert!(!config.trace_apply);
	}

	#[test]
	fn parses_all_fields() {
		let config = ChainConfig::from_toml_str(
			r#"
			late-registration = "deny"
			trace-apply = true
			"#,
		)
		.unwrap();
		assert_eq!(
			config,
			ChainConfig {
				late_registration: LateRegistration::Deny,
				trace_apply: true,
			}
		);
	}

	#[test]
	fn rejects_unknown_fields_and_values() {
		assert!(matches!(
			ChainConfig::from_toml_str("dedupe = true"),
			Err(ConfigError::Parse(_))
		));
		assert!(matches!(
			ChainConfig::from_toml_str(r#"late-registration = "sometimes""#),
			Err(ConfigError::Parse(_))
		));
	}
}
