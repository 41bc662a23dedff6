//! Enum capability for enum-typed fields.

use std::any::Any;

/// An enum whose values have canonical names.
///
/// Blanket-implemented for enums deriving strum's `VariantArray` and `IntoStaticStr`
/// together with `Default`:
///
/// ```ignore
/// #[derive(Clone, Copy, Default, strum::VariantArray, strum::IntoStaticStr)]
/// enum Status {
///     #[default]
///     Active,
///     Inactive,
/// }
/// ```
///
/// The zero value used on parse misses is `Default::default()`.
pub trait ShapeEnum: Clone + Default + Send + Sync + 'static {
	/// Returns the canonical name of this value.
	fn variant_name(&self) -> &'static str;

	/// Returns every value in declaration order.
	fn variants() -> &'static [Self];

	/// Parses a canonical name, ignoring ASCII case.
	fn parse_name(name: &str) -> Option<Self> {
		Self::variants()
			.iter()
			.find(|v| v.variant_name().eq_ignore_ascii_case(name))
			.cloned()
	}
}

impl<E> ShapeEnum for E
where
	E: strum::VariantArray + Clone + Default + Send + Sync + 'static,
	for<'a> &'a E: Into<&'static str>,
{
	fn variant_name(&self) -> &'static str {
		self.into()
	}

	fn variants() -> &'static [Self] {
		E::VARIANTS
	}
}

/// Type-erased enum operations captured by a field descriptor.
#[derive(Clone, Copy)]
pub(crate) struct EnumOps {
	pub(crate) name_of: fn(&dyn Any) -> Option<&'static str>,
	pub(crate) parse_into: fn(&str, &mut dyn Any) -> bool,
}

impl EnumOps {
	pub(crate) fn of<E: ShapeEnum>() -> Self {
		Self {
			name_of: name_of::<E>,
			parse_into: parse_into::<E>,
		}
	}
}

fn name_of<E: ShapeEnum>(value: &dyn Any) -> Option<&'static str> {
	value.downcast_ref::<E>().map(E::variant_name)
}

/// Writes the parsed value, or the zero value on a miss. Returns whether parsing succeeded.
fn parse_into<E: ShapeEnum>(input: &str, slot: &mut dyn Any) -> bool {
	let Some(slot) = slot.downcast_mut::<E>() else {
		return false;
	};
	match E::parse_name(input) {
		Some(value) => {
			*slot = value;
			true
		}
		None => {
			*slot = E::default();
			false
		}
	}
}
