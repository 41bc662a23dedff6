//! Field resolver: proposes name/type matches between two shapes.
//!
//! # Rules
//!
//! For each writable destination field, in declaration order, the first readable source
//! field with the exact same name is considered:
//!
//! 1. Same value type → [`MatchRule::Copy`].
//! 2. Enum source, `String` destination → [`MatchRule::EnumToString`] (canonical name).
//! 3. `String` source, enum destination → [`MatchRule::StringToEnum`] (case-insensitive parse,
//!    zero value on a miss).
//!
//! Anything else produces no action; the destination keeps whatever value it had.

use std::any::TypeId;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::builder::{ActionFn, ActionOrigin, FieldAction};
use crate::options::MapperOptions;
use crate::shape::{FieldDescriptor, Shape, ShapeDescriptor, ValueKind};


/// How a matched source field feeds its destination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
	/// Same-typed copy through the value's `Clone` impl.
	Copy,
	/// Enum value written as its canonical name.
	EnumToString,
	/// String parsed into an enum value.
	StringToEnum,
}

/// A proposed source/destination field pairing.
pub struct FieldMatch<'a, S, D> {
	pub source: &'a FieldDescriptor<S>,
	pub destination: &'a FieldDescriptor<D>,
	pub rule: MatchRule,
}

/// Finds the source field feeding `destination`, if any rule applies.
pub fn match_field<'a, S, D>(
	source: &'a ShapeDescriptor<S>,
	destination: &'a FieldDescriptor<D>,
) -> Option<FieldMatch<'a, S, D>> {
	if !destination.is_writable() {
		return None;
	}
	let candidate = source.readable(destination.name())?;

	let string = TypeId::of::<String>();
	let rule = if candidate.value_type() == destination.value_type() {
		MatchRule::Copy
	} else if candidate.kind() == ValueKind::Enum
		&& candidate.enum_ops().is_some()
		&& destination.value_type() == string
	{
		MatchRule::EnumToString
	} else if candidate.value_type() == string
		&& destination.kind() == ValueKind::Enum
		&& destination.enum_ops().is_some()
	{
		MatchRule::StringToEnum
	} else {
		return None;
	};

	Some(FieldMatch {
		source: candidate,
		destination,
		rule,
	})
}

/// Binds a match into a field transfer closure.
///
/// Returns `None` when either side lacks the accessor or enum operations the rule needs.
pub(crate) fn compile<S: Shape, D: Shape>(
	field: &FieldMatch<'_, S, D>,
	options: &MapperOptions,
) -> Option<ActionFn<S, D>> {
	let read = field.source.reader()?;
	let write = field.destination.writer()?;

	let apply: ActionFn<S, D> = match field.rule {
		MatchRule::Copy => {
			let copy = field.destination.copy_fn();
			Arc::new(move |src: &S, dst: &mut D| {
				copy(read.read(src), write.slot(dst));
			})
		}
		MatchRule::EnumToString => {
			let name_of = field.source.enum_ops()?.name_of;
			Arc::new(move |src: &S, dst: &mut D| {
				let Some(name) = name_of(read.read(src)) else {
					return;
				};
				if let Some(slot) = write.slot(dst).downcast_mut::<String>() {
					slot.clear();
					slot.push_str(name);
				}
			})
		}
		MatchRule::StringToEnum => {
			let parse_into = field.destination.enum_ops()?.parse_into;
			let trim = options.trim_enum_input;
			Arc::new(move |src: &S, dst: &mut D| {
				let Some(input) = read.read(src).downcast_ref::<String>() else {
					return;
				};
				let input = if trim { input.trim() } else { input.as_str() };
				parse_into(input, write.slot(dst));
			})
		}
	};

	Some(apply)
}

/// Auto-matches every writable destination field not named in `exclude`.
///
/// Each destination name is matched at most once.
pub fn resolve<S: Shape, D: Shape>(
	source: &ShapeDescriptor<S>,
	destination: &ShapeDescriptor<D>,
	exclude: &FxHashSet<&'static str>,
	options: &MapperOptions,
) -> Vec<FieldAction<S, D>> {
	let mut seen: FxHashSet<&'static str> = FxHashSet::default();
	let mut actions = Vec::new();

	for field in destination.writable() {
		if exclude.contains(&field.name()) || !seen.insert(field.name()) {
			continue;
		}
		let Some(matched) = match_field(source, field) else {
			continue;
		};
		if let Some(apply) = compile(&matched, options) {
			actions.push(FieldAction::new(
				field.name(),
				ActionOrigin::Auto(matched.rule),
				apply,
			));
		}
	}

	actions
}
