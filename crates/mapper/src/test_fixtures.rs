//! Shapes shared by the unit and invariant tests.

#![allow(dead_code)]

use strum::{IntoStaticStr, VariantArray};

use crate::{MappingRegistry, Shape};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, VariantArray, IntoStaticStr)]
pub(crate) enum Status {
	#[default]
	Active,
	Inactive,
	Suspended,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct Person {
	pub name: String,
	#[shape(enumeration)]
	pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct PersonDto {
	pub name: String,
	pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct Alpha {
	pub x: i32,
	pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct Beta {
	pub x: i32,
	pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct Gamma {
	pub x: i32,
}

/// Same names as [`Alpha`], but `x` has another type.
#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct Wide {
	pub x: i64,
	pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
#[shape(name = "Account")]
pub(crate) struct Account {
	pub id: u64,
	pub owner: String,
	pub tags: Vec<String>,
	#[shape(read_only)]
	pub balance: i64,
	#[shape(skip)]
	pub scratch: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
#[shape(name = "AccountView")]
pub(crate) struct AccountView {
	pub id: u64,
	#[shape(rename = "owner")]
	pub holder: String,
	pub tags: Vec<String>,
	pub balance: i64,
	#[shape(write_only)]
	pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub(crate) struct Keyword {
	pub r#type: String,
}

pub(crate) fn person(name: &str, status: Status) -> Person {
	Person {
		name: name.to_owned(),
		status,
	}
}

pub(crate) fn person_dto(name: &str, status: &str) -> PersonDto {
	PersonDto {
		name: name.to_owned(),
		status: status.to_owned(),
	}
}

/// Registry holding `Person <-> PersonDto` (reverse derived) and `Alpha -> Beta`.
pub(crate) fn people_registry() -> MappingRegistry {
	let mut registry = MappingRegistry::new();
	registry
		.create_map_with::<Person, PersonDto, _>(|cfg| {
			cfg.reverse_map();
			Ok(())
		})
		.expect("person mapping");
	registry.create_map::<Alpha, Beta>();
	registry
}
