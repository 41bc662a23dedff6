use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::MapperOptions;
use crate::test_fixtures::{
	Account, AccountView, Alpha, Beta, Gamma, Person, PersonDto, Status, people_registry, person,
	person_dto,
};

fn mapper() -> Mapper {
	Mapper::new(people_registry())
}

#[test]
fn person_maps_to_dto_and_back() {
	let mapper = mapper();

	let dto: PersonDto = mapper
		.map(Some(&person("Ann", Status::Active)))
		.expect("forward");
	assert_eq!(dto, person_dto("Ann", "Active"));

	let back: Person = mapper
		.map(Some(&person_dto("Bo", "bogus")))
		.expect("reverse");
	assert_eq!(back, person("Bo", Status::default()));
}

#[test]
fn ignored_field_keeps_zero_value() {
	let mut registry = MappingRegistry::new();
	registry
		.create_map_with::<Alpha, Beta, _>(|cfg| {
			cfg.ignore("x")?;
			Ok(())
		})
		.expect("configure");
	let mapper = Mapper::new(registry);

	let beta: Beta = mapper.map(Some(&Alpha { x: 5, y: 2 })).expect("map");
	assert_eq!(beta, Beta { x: 0, y: 2 });
}

#[test]
fn unregistered_pair_is_not_mapped() {
	let err = mapper()
		.map::<Gamma>(Some(&Alpha { x: 1, y: 1 }))
		.expect_err("not mapped");
	assert_eq!(
		err,
		MapError::NotMapped {
			from: Alpha::shape_name(),
			to: Gamma::shape_name(),
		}
	);
}

#[test]
fn absent_source_yields_default() {
	let mapper = Mapper::new(MappingRegistry::new());
	let dto: PersonDto = mapper.map(None).expect("default");
	assert_eq!(dto, PersonDto::default());
	assert_eq!(mapper.cached_pairs(), 0);
}

#[test]
fn repeated_calls_reuse_the_cached_entry() {
	let mapper = mapper();
	assert_eq!(mapper.cached_pairs(), 0);

	for _ in 0..3 {
		let _: Beta = mapper.map(Some(&Alpha { x: 1, y: 2 })).expect("map");
	}
	assert_eq!(mapper.cached_pairs(), 1);

	let _: PersonDto = mapper
		.map(Some(&person("Ann", Status::Active)))
		.expect("map");
	assert_eq!(mapper.cached_pairs(), 2);
}

#[test]
fn map_all_preserves_order_and_mixes_shapes() {
	let mapper = mapper();
	let first = Alpha { x: 1, y: 2 };
	let second = Beta { x: 3, y: 4 };

	let sources = vec![
		Some(&first as &dyn AnyShape),
		None,
		Some(&second as &dyn AnyShape),
	];
	let out: Vec<Beta> = mapper.map_all(sources).expect("map_all");

	assert_eq!(
		out,
		[Beta { x: 1, y: 2 }, Beta::default(), Beta { x: 3, y: 4 }]
	);
}

#[test]
fn map_all_stops_at_first_unmapped_item() {
	let mapper = mapper();
	let alpha = Alpha { x: 1, y: 1 };
	let gamma = Gamma { x: 1 };
	let sources = [&alpha as &dyn AnyShape, &gamma];
	let err = mapper.map_all::<Beta, _>(sources).expect_err("gamma");
	assert!(matches!(err, MapError::NotMapped { .. }));
}

#[test]
fn map_many_resolves_once() {
	let mapper = mapper();
	let people = vec![
		person("Ann", Status::Active),
		person("Bo", Status::Inactive),
		person("Cy", Status::Suspended),
	];

	let dtos: Vec<PersonDto> = mapper.map_many(&people).expect("map_many");
	assert_eq!(
		dtos,
		[
			person_dto("Ann", "Active"),
			person_dto("Bo", "Inactive"),
			person_dto("Cy", "Suspended"),
		]
	);
	assert_eq!(mapper.cached_pairs(), 1);
}

#[test]
fn map_many_fails_for_unregistered_pair_even_when_empty() {
	let err = mapper()
		.map_many::<Alpha, Gamma, _>(&[])
		.expect_err("not mapped");
	assert!(matches!(err, MapError::NotMapped { .. }));
}

#[test]
fn map_into_updates_existing_destination() {
	let mapper = mapper();
	let mut dto = person_dto("old", "Inactive");

	let returned = mapper
		.map_into(Some(&person("new", Status::Suspended)), Some(&mut dto))
		.expect("map_into");
	returned.name.push('!');

	assert_eq!(dto, person_dto("new!", "Suspended"));
}

#[test]
fn map_into_leaves_unmatched_fields_alone() {
	let mut registry = MappingRegistry::new();
	registry.create_map::<Account, AccountView>();
	let mapper = Mapper::new(registry);

	let account = Account {
		id: 1,
		owner: "ann".into(),
		..Default::default()
	};
	let mut view = AccountView {
		summary: "keep me".into(),
		..Default::default()
	};
	mapper
		.map_into(Some(&account), Some(&mut view))
		.expect("map_into");

	assert_eq!(view.holder, "ann");
	assert_eq!(view.summary, "keep me");
}

#[test]
fn map_into_rejects_absent_arguments() {
	let mapper = mapper();
	let mut beta = Beta { x: 9, y: 9 };

	let err = mapper
		.map_into::<Alpha, Beta>(None, Some(&mut beta))
		.expect_err("source");
	assert_eq!(err, MapError::NullArgument { argument: "source" });

	let err = mapper
		.map_into::<Alpha, Beta>(Some(&Alpha::default()), None)
		.expect_err("destination");
	assert_eq!(
		err,
		MapError::NullArgument {
			argument: "destination"
		}
	);
	assert_eq!(beta, Beta { x: 9, y: 9 });
}

#[test]
fn map_into_unregistered_pair_writes_nothing() {
	let mapper = mapper();
	let mut gamma = Gamma { x: 3 };
	let err = mapper
		.map_into(Some(&Alpha { x: 1, y: 1 }), Some(&mut gamma))
		.expect_err("not mapped");
	assert!(matches!(err, MapError::NotMapped { .. }));
	assert_eq!(gamma, Gamma { x: 3 });
}

#[test]
fn identity_mapping_is_synthesized() {
	let mapper = mapper();
	let source = Gamma { x: 11 };

	let copy: Gamma = mapper.map(Some(&source)).expect("identity");
	assert_eq!(copy, source);
	assert_eq!(mapper.cached_pairs(), 1);
	assert!(!mapper.registry().contains(TypePair::of::<Gamma, Gamma>()));
}

#[test]
fn identity_fallback_can_be_disabled() {
	let registry = MappingRegistry::with_options(MapperOptions {
		identity_fallback: false,
		..MapperOptions::default()
	});
	let mapper = Mapper::new(registry);

	let err = mapper
		.map::<Gamma>(Some(&Gamma { x: 1 }))
		.expect_err("no fallback");
	assert!(matches!(err, MapError::NotMapped { .. }));
}

#[test]
fn registered_identity_wins_over_fallback() {
	let mut registry = MappingRegistry::new();
	registry
		.create_map_with::<Alpha, Alpha, _>(|cfg| {
			cfg.ignore("y")?;
			Ok(())
		})
		.expect("configure");
	let mapper = Mapper::from_shared(Arc::new(registry));

	let copy: Alpha = mapper.map(Some(&Alpha { x: 1, y: 2 })).expect("map");
	assert_eq!(copy, Alpha { x: 1, y: 0 });
}

#[test]
fn resolve_returns_typed_mapping() {
	let mapper: Mapper = people_registry().into();
	let mapping = mapper.resolve::<Alpha, Beta>().expect("resolve");
	assert_eq!(mapping.pair(), TypePair::of::<Alpha, Beta>());
	assert_eq!(mapping.map(&Alpha { x: 4, y: 5 }), Beta { x: 4, y: 5 });
}

proptest! {
	#[test]
	fn direct_copy_fields_always_match(x in any::<i32>(), y in any::<i32>()) {
		let mapper = mapper();
		let beta: Beta = mapper.map(Some(&Alpha { x, y })).expect("map");
		prop_assert_eq!(beta, Beta { x, y });
	}

	#[test]
	fn strings_survive_round_trip(name in ".*", index in 0usize..3) {
		let status = [Status::Active, Status::Inactive, Status::Suspended][index];
		let mapper = mapper();
		let dto: PersonDto = mapper.map(Some(&person(&name, status))).expect("forward");
		let back: Person = mapper.map(Some(&dto)).expect("reverse");
		prop_assert_eq!(back, person(&name, status));
	}
}
