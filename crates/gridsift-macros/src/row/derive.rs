//! Implementation of the `#[derive(Row)]` macro.
//!
//! This macro generates implementations of the `Row` and `TypedRow` traits
//! and field name constants for building filters.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result, Type};

use super::attrs::{parse_row_attrs, ColumnType};

/// Main implementation of the Row derive macro.
pub fn row_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Row can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Row can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut descriptors: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let row_attrs = parse_row_attrs(&field.attrs)?;
        if row_attrs.skip {
            continue;
        }

        // Fields whose type cannot be inferred must be annotated
        let column_type = match row_attrs.column_type.or_else(|| infer_column_type(&field.ty)) {
            Some(t) => t,
            None => {
                return Err(Error::new(
                    field.ty.span(),
                    "cannot infer the column type; add #[row(Other)], another column type, or #[row(skip)]",
                ))
            }
        };

        let column_name = row_attrs.rename.unwrap_or_else(|| field_name.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&column_name));

        field_constants.push(quote! {
            /// Column name constant.
            pub const #const_name: &'static str = #column_name;
        });

        let value_expr = match column_type {
            ColumnType::Other => quote! {
                ::gridsift::Value::other(::std::string::ToString::to_string(&self.#field_name))
            },
            _ => quote! { ::gridsift::AsValue::as_value(&self.#field_name) },
        };
        field_matches.push(quote! {
            #column_name => ::std::option::Option::Some(#value_expr),
        });

        let variant = format_ident!("{}", column_type.variant());
        descriptors.push(quote! {
            ::gridsift::FieldDescriptor::new(#column_name, ::gridsift::FieldType::#variant)
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::gridsift::Row for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::std::option::Option<::gridsift::Value<'_>> {
                match field {
                    #(#field_matches)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #impl_generics ::gridsift::TypedRow for #struct_name #ty_generics #where_clause {
            fn schema() -> ::gridsift::Schema {
                ::gridsift::Schema::new(::std::vec![#(#descriptors),*])
            }
        }
    };

    Ok(expanded)
}

/// Infers the column type from common Rust types, looking through
/// `Option`, references and `Box`.
fn infer_column_type(ty: &Type) -> Option<ColumnType> {
    match ty {
        Type::Reference(r) => infer_column_type(&r.elem),
        Type::Group(g) => infer_column_type(&g.elem),
        Type::Paren(p) => infer_column_type(&p.elem),
        Type::Path(p) if p.qself.is_none() => {
            let segment = p.path.segments.last()?;
            let name = segment.ident.to_string();
            match name.as_str() {
                "Option" | "Box" => match &segment.arguments {
                    PathArguments::AngleBracketed(args) => match args.args.first()? {
                        GenericArgument::Type(inner) => infer_column_type(inner),
                        _ => None,
                    },
                    _ => None,
                },
                "String" | "str" => Some(ColumnType::String),
                "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "usize" => Some(ColumnType::Integer),
                "f32" | "f64" => Some(ColumnType::Float),
                "bool" => Some(ColumnType::Boolean),
                "NaiveDate" | "NaiveDateTime" => Some(ColumnType::Date),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == ' ' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
