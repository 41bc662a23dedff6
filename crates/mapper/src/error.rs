//! Error kinds raised by configuration and execution.

/// Execution-time failures.
///
/// Every variant is raised before the destination is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
	/// No mapping is registered for the requested pair.
	#[error("no mapping registered from {from} to {to}")]
	NotMapped { from: &'static str, to: &'static str },

	/// A merge-into-existing call was missing one of its arguments.
	#[error("{argument} must be present when mapping into an existing destination")]
	NullArgument { argument: &'static str },

	/// An erased mapping was applied to instances of other shapes.
	#[error("mapping {from} -> {to} applied to instances of other shapes")]
	ShapeMismatch { from: &'static str, to: &'static str },
}

/// Configuration-time failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The selector does not name a usable field of the destination shape.
	#[error("invalid field selector `{field}` on {shape}: {reason}")]
	InvalidFieldSelector {
		shape: &'static str,
		field: String,
		reason: &'static str,
	},

	/// An explicit getter produces a different type than the destination field holds.
	#[error("field `{field}` on {shape} holds {expected}, explicit mapping produces {found}")]
	FieldTypeMismatch {
		shape: &'static str,
		field: &'static str,
		expected: &'static str,
		found: &'static str,
	},

	/// The builder was already finalized.
	#[error("mapping {from} -> {to} is already finalized")]
	Frozen { from: &'static str, to: &'static str },

	#[error("invalid mapper options: {0}")]
	Options(#[from] toml::de::Error),
}
