//! Attribute parsing for the Row derive macro.
//!
//! This module provides parsers for the `#[row(...)]` field attributes
//! used by the `Row` derive macro.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

/// Declared column type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    /// Any `Display` type, exposed through its display form.
    Other,
}

const EXPECTED: &str = "String, Integer, Float, Decimal, Boolean, Date, Other";

impl ColumnType {
    /// Parse a column type from an identifier.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        Self::parse_name(&ident.to_string()).ok_or_else(|| {
            Error::new(
                ident.span(),
                format!("unknown column type: '{}'. Expected one of: {}", ident, EXPECTED),
            )
        })
    }

    /// Parse a column type from a string literal.
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        Self::parse_name(s).ok_or_else(|| {
            Error::new(
                span,
                format!("unknown column type: '{}'. Expected one of: {}", s, EXPECTED),
            )
        })
    }

    fn parse_name(name: &str) -> Option<Self> {
        let ty = match name {
            "String" | "string" | "Text" | "text" => ColumnType::String,
            "Integer" | "integer" | "Int" | "int" => ColumnType::Integer,
            "Float" | "float" | "Double" | "double" => ColumnType::Float,
            "Decimal" | "decimal" => ColumnType::Decimal,
            "Boolean" | "boolean" | "Bool" | "bool" => ColumnType::Boolean,
            "Date" | "date" | "DateTime" | "datetime" => ColumnType::Date,
            "Other" | "other" => ColumnType::Other,
            _ => return None,
        };
        Some(ty)
    }

    /// Name of the matching `gridsift::FieldType` variant.
    pub fn variant(self) -> &'static str {
        match self {
            ColumnType::String => "String",
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
            ColumnType::Decimal => "Decimal",
            ColumnType::Boolean => "Boolean",
            ColumnType::Date => "Date",
            ColumnType::Other => "Other",
        }
    }
}

/// Field-level attributes from `#[row(...)]`.
#[derive(Debug, Clone, Default)]
pub struct RowAttr {
    /// Declared type; inferred from the Rust type when absent.
    pub column_type: Option<ColumnType>,
    /// Leave this field out of the row.
    pub skip: bool,
    /// Column name (default: field name).
    pub rename: Option<String>,
}

impl Parse for RowAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RowAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // row(String), row(Date), row(skip)
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.column_type = Some(ColumnType::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            p.span(),
                            format!("expected column type: {}, or skip", EXPECTED),
                        ));
                    }
                }

                // rename = "column" or ty = "date"
                Meta::NameValue(nv) => {
                    let value = match &nv.value {
                        syn::Expr::Lit(syn::ExprLit {
                            lit: Lit::Str(s), ..
                        }) => s,
                        other => {
                            return Err(Error::new(
                                other.span(),
                                "expected a string literal",
                            ))
                        }
                    };
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(value.value());
                    } else if nv.path.is_ident("ty") {
                        attr.column_type = Some(ColumnType::from_str(&value.value(), value.span())?);
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown row attribute. Expected a column type, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[row(...)]` attributes from a field's attributes.
pub fn parse_row_attrs(attrs: &[Attribute]) -> Result<RowAttr> {
    for attr in attrs {
        if attr.path().is_ident("row") {
            return attr.parse_args::<RowAttr>();
        }
    }
    Ok(RowAttr::default())
}
