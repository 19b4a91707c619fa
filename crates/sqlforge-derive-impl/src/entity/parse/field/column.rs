// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column configuration from `#[column(...)]`.
//!
//! # Supported Attributes
//!
//! | Attribute | Example | Effect |
//! |-----------|---------|--------|
//! | `name` | `#[column(name = "user_name")]` | Custom column name |
//! | `insertable` | `#[column(insertable = false)]` | Excluded from INSERT |
//! | `updatable` | `#[column(updatable = false)]` | Excluded from UPDATE |
//! | `nullable` | `#[column(nullable)]`, `nullable = false` | NULL handling |
//! | `kind` | `#[column(kind = "large_text")]` | Storage kind override |
//! | `lenient` | `#[column(lenient)]` | Lenient decode |
//! | `skip` | `#[column(skip)]` | Transient field |
//!
//! Boolean options accept both the bare flag and `= true`/`= false`.

use syn::{Attribute, LitBool, LitStr, Token, meta::ParseNestedMeta};

use super::kind::Kind;

/// Column-level configuration.
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    /// Custom column name. Defaults to the field name.
    pub name: Option<String>,

    /// Written by INSERT.
    pub insertable: bool,

    /// Written by UPDATE.
    pub updatable: bool,

    /// Explicit nullability; `None` follows the field type.
    pub nullable: Option<bool>,

    /// Explicit storage kind.
    pub kind: Option<Kind>,

    /// Keep the default value when decoding fails.
    pub lenient: bool,

    /// Transient field.
    pub skip: bool
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            name:       None,
            insertable: true,
            updatable:  true,
            nullable:   None,
            kind:       None,
            lenient:    false,
            skip:       false
        }
    }
}

impl ColumnConfig {
    /// Apply one `#[column(...)]` attribute on top of the current settings.
    ///
    /// # Errors
    ///
    /// Unknown options, wrong literal types and unknown kinds.
    pub fn merge_attr(&mut self, attr: &Attribute) -> darling::Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(meta.error("column name must not be empty"));
                }
                self.name = Some(value.value());
            } else if meta.path.is_ident("insertable") {
                self.insertable = flag(&meta)?;
            } else if meta.path.is_ident("updatable") {
                self.updatable = flag(&meta)?;
            } else if meta.path.is_ident("nullable") {
                self.nullable = Some(flag(&meta)?);
            } else if meta.path.is_ident("lenient") {
                self.lenient = flag(&meta)?;
            } else if meta.path.is_ident("skip") {
                self.skip = flag(&meta)?;
            } else if meta.path.is_ident("kind") {
                let value: LitStr = meta.value()?.parse()?;
                self.kind = Some(Kind::from_name(&value.value()).ok_or_else(|| {
                    syn::Error::new(value.span(), format!("unknown column kind `{}`", value.value()))
                })?);
            } else {
                return Err(meta.error("unsupported column option"));
            }
            Ok(())
        })
        .map_err(darling::Error::from)
    }
}

/// Bare flag is `true`; `= bool` sets it explicitly.
fn flag(meta: &ParseNestedMeta<'_>) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        let value: LitBool = meta.value()?.parse()?;
        Ok(value.value)
    } else {
        Ok(true)
    }
}
