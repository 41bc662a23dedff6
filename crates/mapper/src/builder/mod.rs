//! Per-pair mapping configuration and compilation.
//!
//! # Role
//!
//! A [`MappingBuilder`] accumulates explicit overrides and an ignore set for one
//! `(source, destination)` pair. [`MappingBuilder::finalize`] appends the resolver's
//! auto-matches for every field not already named and compiles the ordered action list into
//! one [`Mapping`]. Finalize freezes the builder.
//!
//! # Precedence
//!
//! 1. **Ignore:** an ignored name never appears in the compiled actions.
//! 2. **Explicit:** `for_member` overrides shadow auto-matches for the same name.
//! 3. **Auto-match:** resolved after all explicit actions, for the remaining names only.
//!
//! A `for_member` call on an ignored field reactivates it (the name leaves the ignore set).
//! An `ignore` call drops any earlier override for the name.

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::ConfigError;
use crate::options::MapperOptions;
use crate::registry::MappingEntry;
use crate::resolver::{self, MatchRule};
use crate::shape::{FieldDescriptor, Shape, ShapeDescriptor, TypePair};


pub(crate) type ActionFn<S, D> = Arc<dyn Fn(&S, &mut D) + Send + Sync>;

/// Where a compiled field action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionOrigin {
	/// Declared with [`MappingBuilder::for_member`].
	Explicit,
	/// Synthesized from an explicit forward action by reverse derivation.
	Reversed(MatchRule),
	/// Discovered by the resolver.
	Auto(MatchRule),
}

/// One unit of transformation: writes a single destination field.
pub struct FieldAction<S, D> {
	name: &'static str,
	origin: ActionOrigin,
	apply: ActionFn<S, D>,
}

impl<S, D> Clone for FieldAction<S, D> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			origin: self.origin,
			apply: Arc::clone(&self.apply),
		}
	}
}

impl<S, D> fmt::Debug for FieldAction<S, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldAction")
			.field("name", &self.name)
			.field("origin", &self.origin)
			.finish_non_exhaustive()
	}
}

impl<S, D> FieldAction<S, D> {
	pub(crate) fn new(name: &'static str, origin: ActionOrigin, apply: ActionFn<S, D>) -> Self {
		Self {
			name,
			origin,
			apply,
		}
	}

	/// Destination field written by this action.
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn origin(&self) -> ActionOrigin {
		self.origin
	}

	#[inline]
	pub fn apply(&self, source: &S, destination: &mut D) {
		(self.apply)(source, destination)
	}
}

/// A compiled `S -> D` transformation.
///
/// Cloning shares the compiled action table.
pub struct Mapping<S, D> {
	pair: TypePair,
	actions: Arc<[FieldAction<S, D>]>,
}

impl<S, D> Clone for Mapping<S, D> {
	fn clone(&self) -> Self {
		Self {
			pair: self.pair,
			actions: Arc::clone(&self.actions),
		}
	}
}

impl<S, D> fmt::Debug for Mapping<S, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Mapping")
			.field("pair", &self.pair)
			.field("actions", &self.actions)
			.finish()
	}
}

impl<S: Shape, D: Shape> Mapping<S, D> {
	pub(crate) fn new(actions: Vec<FieldAction<S, D>>) -> Self {
		Self {
			pair: TypePair::of::<S, D>(),
			actions: actions.into(),
		}
	}

	/// Applies every action, in order, onto an existing destination.
	#[inline]
	pub fn apply(&self, source: &S, destination: &mut D) {
		for action in self.actions.iter() {
			action.apply(source, destination);
		}
	}

	/// Maps into a freshly defaulted destination.
	pub fn map(&self, source: &S) -> D
	where
		D: Default,
	{
		let mut destination = D::default();
		self.apply(source, &mut destination);
		destination
	}

	pub fn pair(&self) -> TypePair {
		self.pair
	}

	pub fn actions(&self) -> &[FieldAction<S, D>] {
		&self.actions
	}
}

/// Configuration for one `S -> D` pair.
///
/// Configuration-time only; not meant to be shared across threads while being mutated.
pub struct MappingBuilder<S: Shape, D: Shape> {
	source: Arc<ShapeDescriptor<S>>,
	destination: Arc<ShapeDescriptor<D>>,
	explicit: IndexMap<&'static str, FieldAction<S, D>>,
	ignored: IndexSet<&'static str>,
	reverse: bool,
	options: MapperOptions,
	compiled: Option<Arc<MappingEntry>>,
}

impl<S: Shape, D: Shape> fmt::Debug for MappingBuilder<S, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MappingBuilder")
			.field("pair", &self.pair())
			.field("explicit", &self.explicit.keys().collect::<Vec<_>>())
			.field("ignored", &self.ignored)
			.field("reverse", &self.reverse)
			.field("finalized", &self.compiled.is_some())
			.finish()
	}
}

impl<S: Shape, D: Shape> MappingBuilder<S, D> {
	/// Creates a builder, reflecting both shapes once.
	pub fn new(options: MapperOptions) -> Self {
		Self::from_descriptors(
			Arc::new(ShapeDescriptor::of()),
			Arc::new(ShapeDescriptor::of()),
			options,
		)
	}

	fn from_descriptors(
		source: Arc<ShapeDescriptor<S>>,
		destination: Arc<ShapeDescriptor<D>>,
		options: MapperOptions,
	) -> Self {
		Self {
			source,
			destination,
			explicit: IndexMap::new(),
			ignored: IndexSet::new(),
			reverse: false,
			options,
			compiled: None,
		}
	}

	pub fn pair(&self) -> TypePair {
		TypePair::new(self.source.id(), self.destination.id())
	}

	/// Writes `getter(source)` into the destination field `name`.
	///
	/// Replaces any earlier override for the same field and reactivates the field if it was
	/// ignored.
	pub fn for_member<F, G>(&mut self, name: &str, getter: G) -> Result<&mut Self, ConfigError>
	where
		F: Send + Sync + 'static,
		G: Fn(&S) -> F + Send + Sync + 'static,
	{
		self.ensure_open()?;

		let destination = Arc::clone(&self.destination);
		let field = writable_field(&destination, name)?;
		if field.value_type() != TypeId::of::<F>() {
			return Err(ConfigError::FieldTypeMismatch {
				shape: destination.id().name(),
				field: field.name(),
				expected: field.value_type_name(),
				found: type_name::<F>(),
			});
		}
		let Some(write) = field.writer() else {
			return Err(not_writable(&destination, name));
		};

		let apply: ActionFn<S, D> = Arc::new(move |src: &S, dst: &mut D| {
			let value = getter(src);
			if let Some(slot) = write.slot(dst).downcast_mut::<F>() {
				*slot = value;
			}
		});

		let field_name = field.name();
		if self.ignored.shift_remove(field_name) {
			debug!(pair = %self.pair(), field = field_name, "explicit mapping reactivated ignored field");
		}
		self.explicit.insert(
			field_name,
			FieldAction::new(field_name, ActionOrigin::Explicit, apply),
		);
		Ok(self)
	}

	/// Excludes the destination field `name` from this mapping.
	///
	/// Drops any earlier override for the field.
	pub fn ignore(&mut self, name: &str) -> Result<&mut Self, ConfigError> {
		self.ensure_open()?;

		let Some(field) = self.destination.field(name) else {
			return Err(ConfigError::InvalidFieldSelector {
				shape: self.destination.id().name(),
				field: name.to_owned(),
				reason: "no such field",
			});
		};
		let field_name = field.name();

		self.explicit.shift_remove(field_name);
		self.ignored.insert(field_name);
		Ok(self)
	}

	/// Requests that the inverse pair be derived and registered alongside this one.
	pub fn reverse_map(&mut self) -> &mut Self {
		self.reverse = true;
		self
	}

	pub fn reverse_requested(&self) -> bool {
		self.reverse
	}

	pub fn is_finalized(&self) -> bool {
		self.compiled.is_some()
	}

	/// Explicitly mapped destination field names, in declaration order.
	pub fn explicit(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.explicit.keys().copied()
	}

	/// Ignored destination field names, in declaration order.
	pub fn ignored(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.ignored.iter().copied()
	}

	/// Resolves auto-matches and compiles the mapping.
	///
	/// The first call freezes the builder; later calls return the same entry without
	/// re-scanning fields.
	pub fn finalize(&mut self) -> Arc<MappingEntry> {
		if let Some(entry) = &self.compiled {
			return Arc::clone(entry);
		}

		let exclude: FxHashSet<&'static str> = self
			.ignored
			.iter()
			.chain(self.explicit.keys())
			.copied()
			.collect();
		let auto = resolver::resolve(&self.source, &self.destination, &exclude, &self.options);

		debug!(
			pair = %self.pair(),
			explicit = self.explicit.len(),
			auto = auto.len(),
			ignored = self.ignored.len(),
			"compiled mapping"
		);

		let mut actions = Vec::with_capacity(self.explicit.len() + auto.len());
		actions.extend(self.explicit.values().cloned());
		actions.extend(auto);

		let entry = Arc::new(MappingEntry::new(
			Mapping::new(actions),
			self.ignored.iter().copied().collect(),
			self.explicit.keys().copied().collect(),
		));
		self.compiled = Some(Arc::clone(&entry));
		entry
	}

	/// Derives the builder for `D -> S`.
	///
	/// Each explicitly mapped name is reversed into a same-named field transfer when both
	/// shapes expose it; arbitrary getters are not inverted. Ignored names are copied verbatim.
	/// The returned builder auto-matches the remaining fields when finalized.
	pub fn derive_reverse(&self) -> MappingBuilder<D, S> {
		let mut reverse = MappingBuilder::<D, S>::from_descriptors(
			Arc::clone(&self.destination),
			Arc::clone(&self.source),
			self.options.clone(),
		);

		for &name in self.explicit.keys() {
			let Some(target) = reverse.destination.field(name) else {
				continue;
			};
			let Some(matched) = resolver::match_field(&reverse.source, target) else {
				continue;
			};
			let Some(apply) = resolver::compile(&matched, &reverse.options) else {
				continue;
			};
			reverse.explicit.insert(
				target.name(),
				FieldAction::new(target.name(), ActionOrigin::Reversed(matched.rule), apply),
			);
		}
		reverse.ignored.extend(self.ignored.iter().copied());

		debug!(
			pair = %reverse.pair(),
			reversed = reverse.explicit.len(),
			ignored = reverse.ignored.len(),
			"derived reverse mapping"
		);
		reverse
	}

	fn ensure_open(&self) -> Result<(), ConfigError> {
		if self.compiled.is_some() {
			let pair = self.pair();
			return Err(ConfigError::Frozen {
				from: pair.source.name(),
				to: pair.destination.name(),
			});
		}
		Ok(())
	}
}

fn writable_field<'a, D>(
	destination: &'a ShapeDescriptor<D>,
	name: &str,
) -> Result<&'a FieldDescriptor<D>, ConfigError> {
	let Some(field) = destination.field(name) else {
		return Err(ConfigError::InvalidFieldSelector {
			shape: destination.id().name(),
			field: name.to_owned(),
			reason: "no such field",
		});
	};
	if !field.is_writable() {
		return Err(not_writable(destination, name));
	}
	Ok(field)
}

fn not_writable<D>(destination: &ShapeDescriptor<D>, name: &str) -> ConfigError {
	ConfigError::InvalidFieldSelector {
		shape: destination.id().name(),
		field: name.to_owned(),
		reason: "field is not writable",
	}
}
