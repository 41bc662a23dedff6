//! Execution-time memo of resolved mapping entries.
//!
//! Readers load the current snapshot without locking. A miss computes the entry outside any
//! lock and publishes it with a compare-and-swap; when two threads race on the same pair, the
//! entry already present in the snapshot wins and the loser's computation is dropped.

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap as HashMap;
use tracing::trace;

use crate::registry::MappingEntry;
use crate::shape::TypePair;

type Entries = HashMap<TypePair, Arc<MappingEntry>>;

pub(crate) struct MappingCache {
	snap: ArcSwap<Entries>,
}

impl Default for MappingCache {
	fn default() -> Self {
		Self {
			snap: ArcSwap::from_pointee(Entries::default()),
		}
	}
}

impl MappingCache {
	#[inline]
	pub(crate) fn get(&self, pair: &TypePair) -> Option<Arc<MappingEntry>> {
		self.snap.load().get(pair).cloned()
	}

	/// Returns the memoized entry for `pair`, computing and publishing it on a miss.
	///
	/// Every caller observes the same `Arc` for a given pair. `compute` may run on several
	/// threads at once; errors are not memoized.
	pub(crate) fn get_or_try_insert_with<E>(
		&self,
		pair: TypePair,
		compute: impl FnOnce() -> Result<Arc<MappingEntry>, E>,
	) -> Result<Arc<MappingEntry>, E> {
		if let Some(hit) = self.get(&pair) {
			return Ok(hit);
		}

		let computed = compute()?;
		loop {
			let cur = self.snap.load_full();
			if let Some(winner) = cur.get(&pair) {
				trace!(pair = %pair, won = false, "mapping memoized by another caller");
				return Ok(Arc::clone(winner));
			}

			let mut next = (*cur).clone();
			next.insert(pair, Arc::clone(&computed));

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				trace!(pair = %pair, won = true, "mapping memoized");
				return Ok(computed);
			}
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.snap.load().len()
	}
}
