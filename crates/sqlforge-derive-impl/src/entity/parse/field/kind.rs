// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Storage kind of a field.
//!
//! Mirrors the runtime `DataKind`. Inference looks at the last path segment
//! of the (`Option`-stripped) type, so `chrono::NaiveDate` and `NaiveDate`
//! agree. Unrecognised types are enums stored by name.

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// Compile-time counterpart of `DataKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Character data.
    Text,
    /// Integers.
    Integer,
    /// Decimals and floats.
    Decimal,
    /// Calendar date.
    Date,
    /// Timestamp.
    DateTime,
    /// Enum stored by member name.
    Enum,
    /// Character large object.
    LargeText,
    /// Binary data.
    Bytes,
    /// Boolean.
    Boolean,
    /// UUID.
    Uuid
}

impl Kind {
    /// Parse a `kind = "..."` value in any case style.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_case(Case::Snake).as_str() {
            "text" => Self::Text,
            "integer" => Self::Integer,
            "decimal" => Self::Decimal,
            "date" => Self::Date,
            "date_time" | "datetime" => Self::DateTime,
            "enum" => Self::Enum,
            "large_text" => Self::LargeText,
            "bytes" => Self::Bytes,
            "boolean" | "bool" => Self::Boolean,
            "uuid" => Self::Uuid,
            _ => return None
        };
        Some(kind)
    }

    /// Infer the kind of a non-`Option` type.
    #[must_use]
    pub fn infer(ty: &Type) -> Self {
        if let Type::Reference(reference) = ty {
            return Self::infer(&reference.elem);
        }
        let Some(segment) = last_segment(ty) else {
            return Self::Enum;
        };
        match segment.ident.to_string().as_str() {
            "String" | "str" => Self::Text,
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => Self::Integer,
            "f32" | "f64" | "Decimal" => Self::Decimal,
            "NaiveDate" => Self::Date,
            "NaiveDateTime" | "DateTime" => Self::DateTime,
            "bool" => Self::Boolean,
            "Uuid" => Self::Uuid,
            "Vec" if generic_arg(segment).is_some_and(|inner| is_ident(inner, "u8")) => {
                Self::Bytes
            }
            _ => Self::Enum
        }
    }

    /// Runtime `DataKind` variant.
    pub fn runtime_tokens(self, krate: &syn::Path) -> TokenStream {
        let variant = match self {
            Self::Text => quote!(Text),
            Self::Integer => quote!(Integer),
            Self::Decimal => quote!(Decimal),
            Self::Date => quote!(Date),
            Self::DateTime => quote!(DateTime),
            Self::Enum => quote!(Enum),
            Self::LargeText => quote!(LargeText),
            Self::Bytes => quote!(Bytes),
            Self::Boolean => quote!(Boolean),
            Self::Uuid => quote!(Uuid)
        };
        quote!(#krate::DataKind::#variant)
    }
}

/// `T` of `Option<T>`, if `ty` is an `Option`.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Option" {
        return None;
    }
    generic_arg(segment)
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        _ => None
    }
}

fn generic_arg(segment: &syn::PathSegment) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None
    })
}

fn is_ident(ty: &Type, name: &str) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == name)
}
