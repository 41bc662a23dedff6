//! Procedural macros for MindMapper.
//!
//! Provides derive macros:
//! * `#[derive(Shape)]` - generates the field accessor table of a mappable struct

use proc_macro::TokenStream;

/// Shape derive macro implementation.
mod shape;

/// Derives `mindmapper::Shape` for a struct with named fields.
///
/// Every field becomes one `FieldDescriptor` in declaration order, readable and writable
/// unless stated otherwise.
///
/// ```ignore
/// #[derive(Shape, Default)]
/// #[shape(name = "Person")]
/// pub struct Person {
///     pub name: String,
///     #[shape(enumeration)]
///     pub status: Status,
///     #[shape(skip)]
///     pub cache: Vec<u8>,
/// }
/// ```
///
/// # Field Kinds
///
/// * `bool`, `char`, integers, floats → `ValueKind::Primitive`
/// * `String` → `ValueKind::String`
/// * `#[shape(enumeration)]` → `ValueKind::Enum` (the type must implement `ShapeEnum`)
/// * Other types → `ValueKind::Other` (must implement `Clone`)
///
/// # Attributes
///
/// - `#[shape(name = "...")]` - Container: overrides `Shape::shape_name`
/// - `#[shape(rename = "...")]` - Field: name used for matching
/// - `#[shape(skip)]` - Field: not part of the shape
/// - `#[shape(read_only)]` / `#[shape(write_only)]` - Field: restricts accessibility
/// - `#[shape(enumeration)]` - Field: enables enum ↔ string coercion
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
	shape::derive_shape(input)
}
