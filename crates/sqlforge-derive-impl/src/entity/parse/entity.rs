// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity definition parsed from `#[derive(Entity)]` input.

mod attrs;

use std::collections::HashSet;

use darling::FromDeriveInput;
use syn::{DeriveInput, Ident};

use self::attrs::EntityAttrs;
use super::field::FieldDef;

/// Complete parsed entity definition.
///
/// Created once per expansion and passed to every generator.
#[derive(Debug)]
pub struct EntityDef {
    /// Struct identifier.
    pub ident: Ident,

    /// Registry key: `#[entity(name)]` or the struct name.
    pub name: String,

    /// Table name.
    pub table: String,

    /// Schema prefix.
    pub schema: Option<String>,

    /// Runtime crate path used in generated code.
    pub krate: syn::Path,

    /// Every named field, transient ones included.
    pub fields: Vec<FieldDef>
}

impl EntityDef {
    /// Parse entity definition from syn's `DeriveInput`.
    ///
    /// 1. Parses `#[entity(...)]` with darling
    /// 2. Parses field attributes for every named field
    /// 3. Checks the primary key and generics
    ///
    /// # Errors
    ///
    /// - missing or blank `table`
    /// - enums, unions, tuple and unit structs
    /// - generic structs
    /// - no `#[id]` field, or more than one
    /// - `#[id]` on a `#[column(skip)]` field
    /// - malformed field attributes
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = EntityAttrs::from_derive_input(input)?;
        let mut errors = darling::Error::accumulator();

        if attrs.table.trim().is_empty() {
            errors.push(darling::Error::custom("`table` must not be empty").with_span(&attrs.ident));
        }
        if !attrs.generics.params.is_empty() {
            errors.push(
                darling::Error::custom("Entity cannot be derived for generic structs")
                    .with_span(&attrs.generics)
            );
        }

        let fields: Vec<FieldDef> = match &input.data {
            syn::Data::Struct(data) => data
                .fields
                .iter()
                .filter_map(|field| errors.handle(FieldDef::from_field(field)))
                .collect(),
            _ => Vec::new()
        };

        let ids: Vec<&FieldDef> = fields.iter().filter(|f| f.is_id).collect();
        match ids.as_slice() {
            [] => errors.push(
                darling::Error::custom("Entity must have exactly one field with #[id] attribute")
                    .with_span(&attrs.ident)
            ),
            [id] if id.column.skip => errors.push(
                darling::Error::custom("#[id] field cannot be #[column(skip)]").with_span(&id.ident)
            ),
            [_] => {}
            [_, extra, ..] => errors.push(
                darling::Error::custom("Entity must have exactly one field with #[id] attribute")
                    .with_span(&extra.ident)
            )
        }

        let mut seen = HashSet::new();
        for field in fields.iter().filter(|f| !f.column.skip) {
            if !seen.insert(field.column_name().to_lowercase()) {
                errors.push(
                    darling::Error::custom(format!(
                        "column `{}` is mapped more than once",
                        field.column_name()
                    ))
                    .with_span(&field.ident)
                );
            }
        }

        errors.finish()?;

        Ok(Self {
            name: attrs.name.unwrap_or_else(|| attrs.ident.to_string()),
            ident: attrs.ident,
            table: attrs.table,
            schema: attrs.schema,
            krate: attrs.krate,
            fields
        })
    }

    /// Fields that map to columns.
    pub fn persistent_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.column.skip)
    }
}
