// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity-level attribute parsing with darling.
//!
//! # Supported Attributes
//!
//! | Attribute | Required | Default | Description |
//! |-----------|----------|---------|-------------|
//! | `table` | Yes | | Table name, may carry a schema prefix |
//! | `schema` | No | none | Schema prefix |
//! | `name` | No | struct name | Registry key |
//! | `crate` | No | `::sqlforge` | Path to the runtime crate |

use darling::FromDeriveInput;
use syn::{Generics, Ident};

/// Default path of the runtime crate in generated code.
pub fn default_crate_path() -> syn::Path {
    syn::parse_quote!(::sqlforge)
}

/// Entity-level attributes parsed from `#[entity(...)]`.
///
/// ```rust,ignore
/// #[entity(table = "bank_accounts", schema = "ledger", name = "Account")]
/// ```
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(entity), supports(struct_named))]
pub struct EntityAttrs {
    /// Struct identifier (e.g., `User`).
    pub ident: Ident,

    /// Generics; entities must not have any.
    pub generics: Generics,

    /// Database table name.
    pub table: String,

    /// Schema prefix.
    #[darling(default)]
    pub schema: Option<String>,

    /// Registry key override.
    #[darling(default)]
    pub name: Option<String>,

    /// Runtime crate path, for crates that depend on `sqlforge-core`
    /// directly.
    #[darling(rename = "crate", default = "default_crate_path")]
    pub krate: syn::Path
}
