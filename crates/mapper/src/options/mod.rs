//! Mapper options.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;


/// Behaviour switches shared by every builder of a registry.
///
/// Captured into compiled closures at finalize time, so changing options affects only
/// mappings declared afterwards.
///
/// ```toml
/// identity-fallback = true
/// trim-enum-input = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct MapperOptions {
	/// Synthesize an auto-matched `T -> T` mapping when none is registered.
	pub identity_fallback: bool,
	/// Trim surrounding whitespace before parsing a string into an enum.
	pub trim_enum_input: bool,
}

impl Default for MapperOptions {
	fn default() -> Self {
		Self {
			identity_fallback: true,
			trim_enum_input: true,
		}
	}
}

impl MapperOptions {
	/// Parses options from a TOML document. Missing keys keep their defaults.
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}
}
