//! Shape descriptors: the reflectable view of a mappable type.
//!
//! # Role
//!
//! A [`Shape`] lists its fields as [`FieldDescriptor`]s. Each descriptor owns type-erased
//! accessor bindings (`&T -> &dyn Any`, `&mut T -> &mut dyn Any`) plus the value operations
//! the resolver needs (clone-into, and for enums name/parse). Descriptors are consulted only
//! while a mapping is being compiled; compiled closures capture the bindings directly.
//!
//! # Invariants
//!
//! - Shape identity is the [`TypeId`]; names are diagnostic only.
//!   - Enforced in: [`ShapeId`]'s `PartialEq`/`Hash`.
//! - A field is readable iff it has a reader and writable iff it has a writer.
//!   - Enforced in: [`FieldBuilder::build`].

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

mod enums;

pub use enums::ShapeEnum;
pub(crate) use enums::EnumOps;


/// Value category of a field.
///
/// Drives the resolver's coercion rules: only `Enum` ↔ `String` pairs are coerced, every
/// other match requires identical value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// `bool`, `char`, integers and floats.
	Primitive,
	/// An enum implementing [`ShapeEnum`].
	Enum,
	/// `String`.
	String,
	/// Anything else; copied through its `Clone` impl.
	Other,
}

/// A type that can take part in a mapping, as source or destination.
///
/// Usually derived with `#[derive(Shape)]`.
pub trait Shape: Sized + Send + Sync + 'static {
	/// Returns the field table in declaration order.
	fn fields() -> Vec<FieldDescriptor<Self>>;

	/// Returns the diagnostic name of this shape.
	fn shape_name() -> &'static str {
		type_name::<Self>()
	}
}

/// Object-safe view of any [`Shape`] instance.
///
/// This is the "object" accepted by the untyped executor calls, where the source shape is
/// only known at runtime.
pub trait AnyShape: Any + Send + Sync {
	/// Returns `self` as [`Any`] for downcasting.
	fn as_any(&self) -> &dyn Any;

	/// Returns the runtime shape identity of `self`.
	fn shape_id(&self) -> ShapeId;
}

impl<T: Shape> AnyShape for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn shape_id(&self) -> ShapeId {
		ShapeId::of::<T>()
	}
}

/// Stable identity of a shape.
#[derive(Clone, Copy)]
pub struct ShapeId {
	type_id: TypeId,
	name: &'static str,
}

impl ShapeId {
	/// Returns the identity of `T`.
	pub fn of<T: Shape>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			name: T::shape_name(),
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for ShapeId {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for ShapeId {}

impl Hash for ShapeId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
	}
}

impl fmt::Debug for ShapeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for ShapeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Registry and cache key: `(source shape, destination shape)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
	pub source: ShapeId,
	pub destination: ShapeId,
}

impl TypePair {
	pub fn new(source: ShapeId, destination: ShapeId) -> Self {
		Self {
			source,
			destination,
		}
	}

	/// Returns the pair for `S -> D`.
	pub fn of<S: Shape, D: Shape>() -> Self {
		Self::new(ShapeId::of::<S>(), ShapeId::of::<D>())
	}

	/// Returns the pair with source and destination swapped.
	pub fn reversed(self) -> Self {
		Self::new(self.destination, self.source)
	}

	/// Returns true when both sides are the same shape.
	pub fn is_identity(&self) -> bool {
		self.source == self.destination
	}
}

impl fmt::Display for TypePair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.source, self.destination)
	}
}

pub(crate) trait Reader<T>: Send + Sync {
	fn read<'a>(&self, owner: &'a T) -> &'a dyn Any;
}

pub(crate) trait Writer<T>: Send + Sync {
	fn slot<'a>(&self, owner: &'a mut T) -> &'a mut dyn Any;
}

struct ReadFn<G, F>(G, PhantomData<fn() -> F>);

struct WriteFn<M, F>(M, PhantomData<fn() -> F>);

impl<T, F, G> Reader<T> for ReadFn<G, F>
where
	F: Any,
	G: Fn(&T) -> &F + Send + Sync,
{
	fn read<'a>(&self, owner: &'a T) -> &'a dyn Any {
		(self.0)(owner)
	}
}

impl<T, F, M> Writer<T> for WriteFn<M, F>
where
	F: Any,
	M: Fn(&mut T) -> &mut F + Send + Sync,
{
	fn slot<'a>(&self, owner: &'a mut T) -> &'a mut dyn Any {
		(self.0)(owner)
	}
}

/// Clones `src` into `dst` when both hold an `F`.
fn clone_into<F: Clone + 'static>(src: &dyn Any, dst: &mut dyn Any) -> bool {
	match (src.downcast_ref::<F>(), dst.downcast_mut::<F>()) {
		(Some(src), Some(dst)) => {
			dst.clone_from(src);
			true
		}
		_ => false,
	}
}

/// One named, typed field of a shape.
pub struct FieldDescriptor<T> {
	name: &'static str,
	kind: ValueKind,
	value_type: TypeId,
	value_type_name: &'static str,
	reader: Option<Arc<dyn Reader<T>>>,
	writer: Option<Arc<dyn Writer<T>>>,
	copy: fn(&dyn Any, &mut dyn Any) -> bool,
	enum_ops: Option<EnumOps>,
}

impl<T> Clone for FieldDescriptor<T> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			kind: self.kind,
			value_type: self.value_type,
			value_type_name: self.value_type_name,
			reader: self.reader.clone(),
			writer: self.writer.clone(),
			copy: self.copy,
			enum_ops: self.enum_ops,
		}
	}
}

impl<T> fmt::Debug for FieldDescriptor<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDescriptor")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("value_type", &self.value_type_name)
			.field("readable", &self.is_readable())
			.field("writable", &self.is_writable())
			.finish()
	}
}

impl<T: 'static> FieldDescriptor<T> {
	/// Starts a descriptor for a field of value type `F`.
	pub fn builder<F>(name: &'static str, kind: ValueKind) -> FieldBuilder<T, F>
	where
		F: Clone + Send + Sync + 'static,
	{
		FieldBuilder {
			name,
			kind,
			reader: None,
			writer: None,
			enum_ops: None,
			_value: PhantomData,
		}
	}
}

impl<T> FieldDescriptor<T> {
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> ValueKind {
		self.kind
	}

	pub fn value_type(&self) -> TypeId {
		self.value_type
	}

	pub fn value_type_name(&self) -> &'static str {
		self.value_type_name
	}

	pub fn is_readable(&self) -> bool {
		self.reader.is_some()
	}

	pub fn is_writable(&self) -> bool {
		self.writer.is_some()
	}

	pub(crate) fn reader(&self) -> Option<Arc<dyn Reader<T>>> {
		self.reader.clone()
	}

	pub(crate) fn writer(&self) -> Option<Arc<dyn Writer<T>>> {
		self.writer.clone()
	}

	pub(crate) fn copy_fn(&self) -> fn(&dyn Any, &mut dyn Any) -> bool {
		self.copy
	}

	pub(crate) fn enum_ops(&self) -> Option<EnumOps> {
		self.enum_ops
	}
}

/// Typed builder for a [`FieldDescriptor`] of value type `F`.
pub struct FieldBuilder<T, F> {
	name: &'static str,
	kind: ValueKind,
	reader: Option<Arc<dyn Reader<T>>>,
	writer: Option<Arc<dyn Writer<T>>>,
	enum_ops: Option<EnumOps>,
	_value: PhantomData<fn() -> F>,
}

impl<T: 'static, F> FieldBuilder<T, F>
where
	F: Clone + Send + Sync + 'static,
{
	/// Makes the field readable through `get`.
	pub fn read<G>(mut self, get: G) -> Self
	where
		G: Fn(&T) -> &F + Send + Sync + 'static,
	{
		self.reader = Some(Arc::new(ReadFn(get, PhantomData)));
		self
	}

	/// Makes the field writable through `get_mut`.
	pub fn write<M>(mut self, get_mut: M) -> Self
	where
		M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
	{
		self.writer = Some(Arc::new(WriteFn(get_mut, PhantomData)));
		self
	}

	pub fn build(self) -> FieldDescriptor<T> {
		FieldDescriptor {
			name: self.name,
			kind: self.kind,
			value_type: TypeId::of::<F>(),
			value_type_name: type_name::<F>(),
			reader: self.reader,
			writer: self.writer,
			copy: clone_into::<F>,
			enum_ops: self.enum_ops,
		}
	}
}

impl<T: 'static, F: ShapeEnum> FieldBuilder<T, F> {
	/// Marks the field as an enum, enabling enum ↔ string coercion.
	pub fn enumeration(mut self) -> Self {
		self.kind = ValueKind::Enum;
		self.enum_ops = Some(EnumOps::of::<F>());
		self
	}
}

impl<T: 'static, F> From<FieldBuilder<T, F>> for FieldDescriptor<T>
where
	F: Clone + Send + Sync + 'static,
{
	fn from(builder: FieldBuilder<T, F>) -> Self {
		builder.build()
	}
}

/// The field table of one shape, read at configuration time only.
pub struct ShapeDescriptor<T> {
	id: ShapeId,
	fields: Vec<FieldDescriptor<T>>,
}

impl<T> Clone for ShapeDescriptor<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			fields: self.fields.clone(),
		}
	}
}

impl<T> fmt::Debug for ShapeDescriptor<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShapeDescriptor")
			.field("id", &self.id)
			.field("fields", &self.fields)
			.finish()
	}
}

impl<T: Shape> ShapeDescriptor<T> {
	/// Reflects `T` into a descriptor.
	pub fn of() -> Self {
		Self {
			id: ShapeId::of::<T>(),
			fields: T::fields(),
		}
	}
}

impl<T> ShapeDescriptor<T> {
	pub fn id(&self) -> ShapeId {
		self.id
	}

	pub fn fields(&self) -> &[FieldDescriptor<T>] {
		&self.fields
	}

	/// Returns the first field named exactly `name`.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Returns the first readable field named exactly `name`.
	pub fn readable(&self, name: &str) -> Option<&FieldDescriptor<T>> {
		self.fields
			.iter()
			.find(|f| f.name == name && f.is_readable())
	}

	/// Iterates writable fields in declaration order.
	pub fn writable(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
		self.fields.iter().filter(|f| f.is_writable())
	}
}
