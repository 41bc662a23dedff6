#![allow(dead_code)]

use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;

use crate::test_fixtures::{
	Alpha, Beta, Gamma, Person, PersonDto, Status, people_registry, person, person_dto,
};
use crate::{MapError, Mapper, MappingRegistry, TypePair};

/// Invariant: Ignore is absolute.
///
/// An ignored destination field is never written by the compiled mapping, even when it
/// auto-matches and even when an explicit override for it was declared first.
pub(crate) fn inv_ignore_is_absolute() {
	let mut registry = MappingRegistry::new();
	let entry = registry
		.create_map_with::<Alpha, Beta, _>(|cfg| {
			cfg.for_member("x", |a: &Alpha| a.x * 100)?.ignore("x")?;
			Ok(())
		})
		.expect("configure");

	assert!(!entry.writes("x"));
	assert!(entry.is_ignored("x"));

	let mapper = Mapper::new(registry);
	let beta: Beta = mapper.map(Some(&Alpha { x: 5, y: 2 })).expect("map");
	assert_eq!(beta, Beta { x: 0, y: 2 });
}

/// Invariant: Explicit overrides take precedence over auto-matches.
///
/// The override's value lands in the field and its action runs before every auto-match.
pub(crate) fn inv_explicit_override_precedence() {
	let mut registry = MappingRegistry::new();
	let entry = registry
		.create_map_with::<Alpha, Beta, _>(|cfg| {
			cfg.for_member("y", |a: &Alpha| a.x + a.y)?;
			Ok(())
		})
		.expect("configure");

	let names: Vec<_> = entry.plan().iter().map(|step| step.name).collect();
	assert_eq!(names, ["y", "x"]);

	let mapper = Mapper::new(registry);
	let beta: Beta = mapper.map(Some(&Alpha { x: 3, y: 4 })).expect("map");
	assert_eq!(beta, Beta { x: 3, y: 7 });
}

/// Invariant: Enum to string to enum restores the value.
///
/// Unparsable strings degrade to the enum's zero value instead of failing.
pub(crate) fn inv_enum_string_round_trip() {
	let mapper = Mapper::new(people_registry());

	for status in [Status::Active, Status::Inactive, Status::Suspended] {
		let dto: PersonDto = mapper.map(Some(&person("Ann", status))).expect("forward");
		let back: Person = mapper.map(Some(&dto)).expect("reverse");
		assert_eq!(back.status, status);
	}

	let back: Person = mapper
		.map(Some(&person_dto("Bo", "bogus")))
		.expect("reverse");
	assert_eq!(back, person("Bo", Status::default()));
}

/// Invariant: Reverse derivation keeps every forward ignore.
pub(crate) fn inv_reverse_containment() {
	let mut registry = MappingRegistry::new();
	registry
		.create_map_with::<Alpha, Beta, _>(|cfg| {
			cfg.ignore("y")?.reverse_map();
			Ok(())
		})
		.expect("configure");

	let reverse = registry
		.try_get_mapping(TypePair::of::<Beta, Alpha>())
		.expect("reverse registered");
	assert!(reverse.is_ignored("y"));
	assert!(!reverse.writes("y"));
}

/// Invariant: Concurrent first use keeps a single cached entry.
///
/// Every racing caller gets a correct result and the same memoized entry.
pub(crate) fn inv_cache_single_winner() {
	const THREADS: usize = 8;

	let mapper = Mapper::new(people_registry());
	let barrier = Barrier::new(THREADS);
	let pair = TypePair::of::<Person, PersonDto>();

	let entries = thread::scope(|scope| {
		let handles: Vec<_> = (0..THREADS)
			.map(|i| {
				let mapper = &mapper;
				let barrier = &barrier;
				scope.spawn(move || {
					barrier.wait();
					let name = format!("p{i}");
					let dto: PersonDto = mapper
						.map(Some(&person(&name, Status::Inactive)))
						.expect("map");
					assert_eq!(dto, person_dto(&name, "Inactive"));
					mapper.entry_for::<PersonDto>(pair).expect("cached")
				})
			})
			.collect();
		handles
			.into_iter()
			.map(|handle| handle.join().expect("thread"))
			.collect::<Vec<_>>()
	});

	assert_eq!(mapper.cached_pairs(), 1);
	let first = &entries[0];
	assert!(entries.iter().all(|entry| Arc::ptr_eq(entry, first)));
}

/// Invariant: Unregistered pairs fail with `NotMapped`.
pub(crate) fn inv_unregistered_pair_is_not_mapped() {
	let mapper = Mapper::new(people_registry());

	let err = mapper
		.map::<Gamma>(Some(&Alpha { x: 1, y: 2 }))
		.expect_err("unregistered");
	assert!(matches!(err, MapError::NotMapped { .. }));
	assert_eq!(mapper.cached_pairs(), 0);
}

#[cfg_attr(test, test)]
pub(crate) fn test_ignore_is_absolute() {
	inv_ignore_is_absolute();
}

#[cfg_attr(test, test)]
pub(crate) fn test_explicit_override_precedence() {
	inv_explicit_override_precedence();
}

#[cfg_attr(test, test)]
pub(crate) fn test_enum_string_round_trip() {
	inv_enum_string_round_trip();
}

#[cfg_attr(test, test)]
pub(crate) fn test_reverse_containment() {
	inv_reverse_containment();
}

#[cfg_attr(test, test)]
pub(crate) fn test_cache_single_winner() {
	inv_cache_single_winner();
}

#[cfg_attr(test, test)]
pub(crate) fn test_unregistered_pair_is_not_mapped() {
	inv_unregistered_pair_is_not_mapped();
}
