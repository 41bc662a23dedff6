//! Shape derive macro implementation.
//!
//! Provides `#[derive(Shape)]` for structs with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Field, Fields, Type, parse_macro_input};

/// Type names treated as `ValueKind::Primitive`.
const PRIMITIVES: &[&str] = &[
	"bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
	"usize", "f32", "f64",
];

#[derive(Default)]
struct FieldAttrs {
	rename: Option<String>,
	skip: bool,
	read_only: bool,
	write_only: bool,
	enumeration: bool,
}

/// Entry point for the `#[derive(Shape)]` macro.
pub fn derive_shape(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	match expand(&input) {
		Ok(tokens) => tokens.into(),
		Err(e) => e.to_compile_error().into(),
	}
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
	let ident = &input.ident;

	let Data::Struct(data) = &input.data else {
		return Err(syn::Error::new_spanned(
			input,
			"Shape can only be derived for structs with named fields",
		));
	};
	let Fields::Named(named) = &data.fields else {
		return Err(syn::Error::new_spanned(
			&data.fields,
			"Shape can only be derived for structs with named fields",
		));
	};

	let shape_name = parse_container_name(input)?;

	let mut descriptors = Vec::with_capacity(named.named.len());
	for field in &named.named {
		let attrs = parse_field_attrs(field)?;
		if attrs.skip {
			continue;
		}
		descriptors.push(field_descriptor(field, attrs));
	}

	let shape_name_fn = shape_name.map(|name| {
		quote! {
			fn shape_name() -> &'static str {
				#name
			}
		}
	});

	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics ::mindmapper::Shape for #ident #ty_generics #where_clause {
			fn fields() -> ::std::vec::Vec<::mindmapper::FieldDescriptor<Self>> {
				::std::vec![#(#descriptors),*]
			}

			#shape_name_fn
		}
	})
}

fn parse_container_name(input: &DeriveInput) -> syn::Result<Option<String>> {
	let mut name = None;
	for attr in input.attrs.iter().filter(|a| a.path().is_ident("shape")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("name") {
				let value: syn::LitStr = meta.value()?.parse()?;
				name = Some(value.value());
				Ok(())
			} else {
				Err(meta.error("unknown shape container attribute"))
			}
		})?;
	}
	Ok(name)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
	let mut attrs = FieldAttrs::default();
	for attr in field.attrs.iter().filter(|a| a.path().is_ident("shape")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("rename") {
				let value: syn::LitStr = meta.value()?.parse()?;
				attrs.rename = Some(value.value());
			} else if meta.path.is_ident("skip") {
				attrs.skip = true;
			} else if meta.path.is_ident("read_only") {
				attrs.read_only = true;
			} else if meta.path.is_ident("write_only") {
				attrs.write_only = true;
			} else if meta.path.is_ident("enumeration") {
				attrs.enumeration = true;
			} else {
				return Err(meta.error("unknown shape field attribute"));
			}
			Ok(())
		})?;
	}

	if attrs.read_only && attrs.write_only {
		return Err(syn::Error::new_spanned(
			field,
			"a field cannot be both read_only and write_only",
		));
	}

	Ok(attrs)
}

fn field_descriptor(field: &Field, attrs: FieldAttrs) -> TokenStream2 {
	// Named fields always carry an ident.
	let member = field
		.ident
		.clone()
		.unwrap_or_else(|| format_ident!("__unnamed"));
	let ty = &field.ty;
	let name = attrs
		.rename
		.unwrap_or_else(|| member.unraw().to_string());
	let kind = value_kind(ty, attrs.enumeration);

	let enumeration = attrs.enumeration.then(|| quote! { .enumeration() });
	let read = (!attrs.write_only).then(|| quote! { .read(|owner: &Self| &owner.#member) });
	let write = (!attrs.read_only).then(|| quote! { .write(|owner: &mut Self| &mut owner.#member) });

	quote! {
		::mindmapper::FieldDescriptor::<Self>::builder::<#ty>(#name, ::mindmapper::ValueKind::#kind)
			#enumeration
			#read
			#write
			.build()
	}
}

fn value_kind(ty: &Type, enumeration: bool) -> syn::Ident {
	if enumeration {
		return format_ident!("Enum");
	}

	let Type::Path(path) = ty else {
		return format_ident!("Other");
	};
	if path.qself.is_some() {
		return format_ident!("Other");
	}
	let Some(last) = path.path.segments.last() else {
		return format_ident!("Other");
	};
	if !last.arguments.is_empty() {
		return format_ident!("Other");
	}

	let name = last.ident.to_string();
	if PRIMITIVES.contains(&name.as_str()) {
		format_ident!("Primitive")
	} else if name == "String" {
		format_ident!("String")
	} else {
		format_ident!("Other")
	}
}
