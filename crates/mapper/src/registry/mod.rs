//! Mapping registry: the declared, compiled mapping for every type pair.
//!
//! # Role
//!
//! Declaration happens through [`MappingRegistry::create_map`] and
//! [`MappingRegistry::create_map_with`], which build, finalize and store one
//! [`MappingEntry`] per pair (replacing any earlier entry for the same pair). The registry is
//! then moved into a [`crate::Mapper`]; from that point it is only read.
//!
//! # Invariants
//!
//! - At most one entry per pair; the last declaration wins.
//!   - Enforced in: `MappingRegistry::insert`.
//! - A declaration whose configuration fails leaves the registry untouched.
//!   - Enforced in: [`MappingRegistry::create_map_with`].
//! - Lookups never compile or mutate.
//!   - Enforced in: [`MappingRegistry::try_get_mapping`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

use crate::builder::{ActionOrigin, Mapping, MappingBuilder};
use crate::error::{ConfigError, MapError};
use crate::options::MapperOptions;
use crate::shape::{Shape, TypePair};


/// One step of a compiled mapping, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlannedField {
	pub name: &'static str,
	pub origin: ActionOrigin,
}

/// Object-safe face of a compiled [`Mapping`].
trait ErasedMapping: Send + Sync {
	fn apply_erased(&self, source: &dyn Any, destination: &mut dyn Any) -> bool;

	fn as_any(&self) -> &dyn Any;
}

impl<S: Shape, D: Shape> ErasedMapping for Mapping<S, D> {
	fn apply_erased(&self, source: &dyn Any, destination: &mut dyn Any) -> bool {
		match (source.downcast_ref::<S>(), destination.downcast_mut::<D>()) {
			(Some(source), Some(destination)) => {
				self.apply(source, destination);
				true
			}
			_ => false,
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// The compiled artifact for one type pair. Immutable once created.
pub struct MappingEntry {
	pair: TypePair,
	ignored: Box<[&'static str]>,
	explicit: Box<[&'static str]>,
	plan: Box<[PlannedField]>,
	mapping: Arc<dyn ErasedMapping>,
}

impl fmt::Debug for MappingEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MappingEntry")
			.field("pair", &self.pair)
			.field("ignored", &self.ignored)
			.field("explicit", &self.explicit)
			.field("plan", &self.plan)
			.finish_non_exhaustive()
	}
}

impl MappingEntry {
	pub(crate) fn new<S: Shape, D: Shape>(
		mapping: Mapping<S, D>,
		ignored: Vec<&'static str>,
		explicit: Vec<&'static str>,
	) -> Self {
		let plan = mapping
			.actions()
			.iter()
			.map(|action| PlannedField {
				name: action.name(),
				origin: action.origin(),
			})
			.collect();
		Self {
			pair: mapping.pair(),
			ignored: ignored.into(),
			explicit: explicit.into(),
			plan,
			mapping: Arc::new(mapping),
		}
	}

	pub fn pair(&self) -> TypePair {
		self.pair
	}

	/// Ignored destination names as configured.
	pub fn ignored(&self) -> &[&'static str] {
		&self.ignored
	}

	/// Explicitly mapped destination names as configured.
	pub fn explicit(&self) -> &[&'static str] {
		&self.explicit
	}

	/// Compiled field actions, in execution order.
	pub fn plan(&self) -> &[PlannedField] {
		&self.plan
	}

	pub fn is_ignored(&self, name: &str) -> bool {
		self.ignored.iter().any(|ignored| *ignored == name)
	}

	/// Returns true if some compiled action writes the destination field `name`.
	pub fn writes(&self, name: &str) -> bool {
		self.plan.iter().any(|step| step.name == name)
	}

	/// Returns the typed mapping when `S -> D` is this entry's pair.
	pub fn typed<S: Shape, D: Shape>(&self) -> Option<Mapping<S, D>> {
		self.mapping
			.as_any()
			.downcast_ref::<Mapping<S, D>>()
			.cloned()
	}

	/// Applies the mapping to type-erased instances.
	///
	/// Fails without writing anything when the instances are not of this entry's shapes.
	pub fn apply_erased(&self, source: &dyn Any, destination: &mut dyn Any) -> Result<(), MapError> {
		if self.mapping.apply_erased(source, destination) {
			Ok(())
		} else {
			Err(MapError::ShapeMismatch {
				from: self.pair.source.name(),
				to: self.pair.destination.name(),
			})
		}
	}
}

/// Holds the finalized mapping of every declared pair.
#[derive(Default)]
pub struct MappingRegistry {
	entries: HashMap<TypePair, Arc<MappingEntry>>,
	options: MapperOptions,
}

impl fmt::Debug for MappingRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MappingRegistry")
			.field("pairs", &self.entries.keys().collect::<Vec<_>>())
			.field("options", &self.options)
			.finish()
	}
}

impl MappingRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: MapperOptions) -> Self {
		Self {
			entries: HashMap::default(),
			options,
		}
	}

	pub fn options(&self) -> &MapperOptions {
		&self.options
	}

	/// Declares `S -> D` with auto-matching only.
	pub fn create_map<S: Shape, D: Shape>(&mut self) -> Arc<MappingEntry> {
		let mut builder = MappingBuilder::<S, D>::new(self.options.clone());
		self.register(&mut builder)
	}

	/// Declares `S -> D`, letting `configure` add overrides, ignores, or reverse derivation.
	///
	/// ```ignore
	/// registry.create_map_with::<Person, PersonDto, _>(|cfg| {
	///     cfg.ignore("age")?
	///         .for_member("display", |p: &Person| p.name.to_uppercase())?
	///         .reverse_map();
	///     Ok(())
	/// })?;
	/// ```
	pub fn create_map_with<S, D, F>(&mut self, configure: F) -> Result<Arc<MappingEntry>, ConfigError>
	where
		S: Shape,
		D: Shape,
		F: FnOnce(&mut MappingBuilder<S, D>) -> Result<(), ConfigError>,
	{
		let mut builder = MappingBuilder::<S, D>::new(self.options.clone());
		configure(&mut builder)?;
		Ok(self.register(&mut builder))
	}

	/// Finalizes `builder` and stores its entry, deriving the reverse entry if requested.
	///
	/// The reverse entry is stored first so that, for `S == D`, the forward configuration
	/// is the one that remains.
	fn register<S: Shape, D: Shape>(&mut self, builder: &mut MappingBuilder<S, D>) -> Arc<MappingEntry> {
		let entry = builder.finalize();
		if builder.reverse_requested() {
			let reverse = builder.derive_reverse().finalize();
			self.insert(reverse);
		}
		self.insert(Arc::clone(&entry));
		entry
	}

	fn insert(&mut self, entry: Arc<MappingEntry>) {
		let pair = entry.pair();
		if self.entries.insert(pair, entry).is_some() {
			debug!(pair = %pair, "replaced existing mapping");
		}
	}

	/// Looks up the entry for `pair`.
	pub fn try_get_mapping(&self, pair: TypePair) -> Option<Arc<MappingEntry>> {
		self.entries.get(&pair).cloned()
	}

	/// Looks up the typed mapping for `S -> D`.
	pub fn try_get<S: Shape, D: Shape>(&self) -> Option<Mapping<S, D>> {
		self.entries.get(&TypePair::of::<S, D>())?.typed()
	}

	pub fn contains(&self, pair: TypePair) -> bool {
		self.entries.contains_key(&pair)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates declared pairs in no particular order.
	pub fn pairs(&self) -> impl Iterator<Item = TypePair> + '_ {
		self.entries.keys().copied()
	}
}
