//! Compile-once object-to-object mapping.
//!
//! # Mental model
//!
//! - A [`Shape`] is a struct described by an ordered table of named, typed fields, usually
//!   produced by `#[derive(Shape)]`.
//! - [`MappingRegistry`] is the declaration phase: each `create_map` builds a
//!   [`MappingBuilder`] for one [`TypePair`], resolves auto-matches once, and stores the
//!   compiled [`MappingEntry`].
//! - [`Mapper`] is the execution phase: it owns the finished registry and memoizes resolved
//!   entries in a lock-free cache shared by all calling threads.
//!
//! ```ignore
//! use mindmapper::{Mapper, MappingRegistry, Shape};
//!
//! #[derive(Default, Shape)]
//! struct Person { name: String, #[shape(enumeration)] status: Status }
//!
//! #[derive(Default, Shape)]
//! struct PersonDto { name: String, status: String }
//!
//! let mut registry = MappingRegistry::new();
//! registry.create_map_with::<Person, PersonDto, _>(|cfg| {
//!     cfg.reverse_map();
//!     Ok(())
//! })?;
//!
//! let mapper = Mapper::new(registry);
//! let dto: PersonDto = mapper.map(Some(&person))?;
//! ```
//!
//! # Precedence
//!
//! Ignore beats explicit overrides beats auto-matching. Auto-matched actions always run after
//! explicit ones, whatever the declaration order.
//!
//! # Concurrency
//!
//! Declaration needs `&mut MappingRegistry`; moving the registry into a `Mapper` ends it.
//! Every `Mapper` operation takes `&self` and is safe to call from any number of threads.

extern crate self as mindmapper;

pub mod builder;
mod cache;
pub mod error;
pub mod executor;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod shape;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_fixtures;

pub use builder::{ActionOrigin, FieldAction, Mapping, MappingBuilder};
pub use error::{ConfigError, MapError};
pub use executor::Mapper;
#[cfg(feature = "derive")]
pub use mindmapper_macros::Shape;
pub use options::MapperOptions;
pub use registry::{MappingEntry, MappingRegistry, PlannedField};
pub use resolver::MatchRule;
pub use shape::{
	AnyShape, FieldBuilder, FieldDescriptor, Shape, ShapeDescriptor, ShapeEnum, ShapeId,
	TypePair, ValueKind,
};
pub use strum;
