//! Mapping executor: the caller-facing facade over a finished registry.
//!
//! # Role
//!
//! [`Mapper`] owns the registry (declaration is over once it is constructed) and a concurrent
//! cache of resolved entries. Every operation resolves its pair through the cache, then runs the
//! pre-compiled field actions; no matching happens on this path after the first call per pair.
//!
//! # Invariants
//!
//! - Resolution failures are raised before the destination is touched.
//!   - Enforced in: [`Mapper::map`], [`Mapper::map_into`].
//!   - Tested by: `invariants::test_unregistered_pair_is_not_mapped`.
//! - Concurrent first use of a pair leaves exactly one memoized entry.
//!   - Enforced in: `MappingCache::get_or_try_insert_with`.
//!   - Tested by: `invariants::test_cache_single_winner`.

use std::sync::Arc;

use tracing::trace;

use crate::builder::{Mapping, MappingBuilder};
use crate::cache::MappingCache;
use crate::error::MapError;
use crate::registry::{MappingEntry, MappingRegistry};
use crate::shape::{AnyShape, Shape, ShapeId, TypePair};

#[cfg(test)]
mod tests;

/// Executes registered mappings.
///
/// `Mapper` is `Send + Sync`; share it behind an `Arc` across threads.
pub struct Mapper {
	registry: Arc<MappingRegistry>,
	cache: MappingCache,
}

impl std::fmt::Debug for Mapper {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Mapper")
			.field("registry", &self.registry)
			.field("cached", &self.cache.len())
			.finish()
	}
}

impl From<MappingRegistry> for Mapper {
	fn from(registry: MappingRegistry) -> Self {
		Self::new(registry)
	}
}

impl Mapper {
	pub fn new(registry: MappingRegistry) -> Self {
		Self::from_shared(Arc::new(registry))
	}

	pub fn from_shared(registry: Arc<MappingRegistry>) -> Self {
		Self {
			registry,
			cache: MappingCache::default(),
		}
	}

	pub fn registry(&self) -> &MappingRegistry {
		&self.registry
	}

	/// Number of pairs memoized so far.
	pub fn cached_pairs(&self) -> usize {
		self.cache.len()
	}

	/// Maps `source` into a new `D`.
	///
	/// An absent source yields `D::default()` without consulting the registry.
	pub fn map<D>(&self, source: Option<&dyn AnyShape>) -> Result<D, MapError>
	where
		D: Shape + Default,
	{
		let Some(source) = source else {
			return Ok(D::default());
		};
		let entry = self.entry_for::<D>(TypePair::new(source.shape_id(), ShapeId::of::<D>()))?;

		let mut destination = D::default();
		entry.apply_erased(source.as_any(), &mut destination)?;
		Ok(destination)
	}

	/// Maps every source, in order. Absent items become `D::default()`.
	///
	/// Sources may be of different shapes; each is resolved through the cache.
	pub fn map_all<'a, D, I>(&self, sources: I) -> Result<Vec<D>, MapError>
	where
		D: Shape + Default,
		I: IntoIterator,
		I::Item: Into<Option<&'a dyn AnyShape>>,
	{
		let sources = sources.into_iter();
		let mut out = match sources.size_hint() {
			(lower, Some(upper)) if lower == upper => Vec::with_capacity(lower),
			_ => Vec::new(),
		};
		for source in sources {
			out.push(self.map::<D>(source.into())?);
		}
		Ok(out)
	}

	/// Maps a homogeneous sequence, resolving `S -> D` once for all items.
	///
	/// Fails with [`MapError::NotMapped`] even when `sources` is empty.
	pub fn map_many<'a, S, D, I>(&self, sources: I) -> Result<Vec<D>, MapError>
	where
		S: Shape,
		D: Shape + Default,
		I: IntoIterator<Item = &'a S>,
	{
		let mapping = self.resolve::<S, D>()?;
		Ok(sources.into_iter().map(|source| mapping.map(source)).collect())
	}

	/// Applies `S -> D` onto an existing destination and hands it back.
	pub fn map_into<'d, S, D>(
		&self,
		source: Option<&S>,
		destination: Option<&'d mut D>,
	) -> Result<&'d mut D, MapError>
	where
		S: Shape,
		D: Shape,
	{
		let Some(source) = source else {
			return Err(MapError::NullArgument { argument: "source" });
		};
		let Some(destination) = destination else {
			return Err(MapError::NullArgument {
				argument: "destination",
			});
		};

		self.resolve::<S, D>()?.apply(source, destination);
		Ok(destination)
	}

	/// Resolves the typed mapping for `S -> D` through the cache.
	pub fn resolve<S: Shape, D: Shape>(&self) -> Result<Mapping<S, D>, MapError> {
		let pair = TypePair::of::<S, D>();
		self.entry_for::<D>(pair)?
			.typed::<S, D>()
			.ok_or(MapError::ShapeMismatch {
				from: pair.source.name(),
				to: pair.destination.name(),
			})
	}

	/// Returns the memoized entry for `pair`, whose destination is `D`.
	pub(crate) fn entry_for<D: Shape>(&self, pair: TypePair) -> Result<Arc<MappingEntry>, MapError> {
		self.cache
			.get_or_try_insert_with(pair, || self.lookup::<D>(pair))
	}

	fn lookup<D: Shape>(&self, pair: TypePair) -> Result<Arc<MappingEntry>, MapError> {
		if let Some(entry) = self.registry.try_get_mapping(pair) {
			return Ok(entry);
		}

		let options = self.registry.options();
		if pair.is_identity() && options.identity_fallback {
			trace!(pair = %pair, "synthesizing identity mapping");
			return Ok(MappingBuilder::<D, D>::new(options.clone()).finalize());
		}

		Err(MapError::NotMapped {
			from: pair.source.name(),
			to: pair.destination.name(),
		})
	}
}
