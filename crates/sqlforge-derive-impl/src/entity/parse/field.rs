// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level attribute parsing.
//!
//! - `#[id]` marks the primary key
//! - [`column`] handles `#[column(...)]`
//! - [`kind`] infers the storage kind from the field type
//!
//! ```rust,ignore
//! #[id]                                   // is_id = true
//! pub id: Option<i64>,
//!
//! #[column(name = "body", kind = "large_text")]
//! pub content: Option<String>,
//!
//! #[column(skip)]                         // never persisted
//! pub cache: Vec<String>,
//! ```

mod column;
mod kind;

pub use column::ColumnConfig;
pub use kind::Kind;
use syn::{Field, Ident, Type};

/// Field definition with all parsed attributes.
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier.
    pub ident: Ident,

    /// Field type.
    pub ty: Type,

    /// Marked `#[id]`.
    pub is_id: bool,

    /// `Option<T>` field.
    pub is_option: bool,

    /// Storage kind, explicit or inferred.
    pub kind: Kind,

    /// `#[column(...)]` settings.
    pub column: ColumnConfig
}

impl FieldDef {
    /// Parse field definition from syn's `Field`.
    ///
    /// # Errors
    ///
    /// Unnamed fields and malformed `#[column(...)]` attributes.
    pub fn from_field(field: &Field) -> darling::Result<Self> {
        let ident = field.ident.clone().ok_or_else(|| {
            darling::Error::custom("Entity fields must be named").with_span(field)
        })?;

        let mut is_id = false;
        let mut column = ColumnConfig::default();
        for attr in &field.attrs {
            if attr.path().is_ident("id") {
                is_id = true;
            } else if attr.path().is_ident("column") {
                column.merge_attr(attr)?;
            }
        }

        let inner = kind::option_inner(&field.ty);
        let kind = match &column.kind {
            Some(explicit) => *explicit,
            None => Kind::infer(inner.unwrap_or(&field.ty))
        };

        Ok(Self {
            ident,
            ty: field.ty.clone(),
            is_id,
            is_option: inner.is_some(),
            kind,
            column
        })
    }

    /// Field name as used by `Entity::get`/`Entity::set`.
    #[must_use]
    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    /// Column name, using the custom name if set.
    #[must_use]
    pub fn column_name(&self) -> String {
        self.column.name.clone().unwrap_or_else(|| self.name())
    }

    /// Nullability: explicit setting, else whether the field is an `Option`.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.column.nullable.unwrap_or(self.is_option)
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn parse(field: Field) -> FieldDef {
        FieldDef::from_field(&field).unwrap()
    }

    #[test]
    fn plain_field() {
        let f = parse(parse_quote!(pub name: String));
        assert_eq!(f.name(), "name");
        assert_eq!(f.column_name(), "name");
        assert!(!f.is_id);
        assert!(!f.nullable());
        assert_eq!(f.kind, Kind::Text);
    }

    #[test]
    fn option_id_field() {
        let f = parse(parse_quote!(#[id] pub id: Option<i64>));
        assert!(f.is_id);
        assert!(f.is_option);
        assert!(f.nullable());
        assert_eq!(f.kind, Kind::Integer);
    }

    #[test]
    fn column_overrides() {
        let f = parse(parse_quote!(
            #[column(name = "body", kind = "LargeText", nullable = false)]
            pub content: Option<String>
        ));
        assert_eq!(f.column_name(), "body");
        assert_eq!(f.kind, Kind::LargeText);
        assert!(!f.nullable());
    }

    #[test]
    fn split_column_attributes_merge() {
        let f = parse(parse_quote!(
            #[column(insertable = false)]
            #[column(lenient)]
            pub status: Option<Status>
        ));
        assert!(!f.column.insertable);
        assert!(f.column.lenient);
        assert_eq!(f.kind, Kind::Enum);
    }

    #[test]
    fn unknown_column_option_fails() {
        let field: Field = parse_quote!(#[column(unique)] pub name: String);
        assert!(FieldDef::from_field(&field).is_err());
    }
}
