// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[derive(Entity)]` for sqlforge.
//!
//! The derive is a thin declaration layer: it turns an annotated struct into
//! a static `EntityDescriptor` plus by-name field accessors. All SQL is
//! synthesized at runtime by `sqlforge-core`.
//!
//! Use it through the `sqlforge` crate.
//!
//! # Attribute Quick Reference
//!
//! ## Entity-Level `#[entity(...)]`
//!
//! | Attribute | Required | Default | Description |
//! |-----------|----------|---------|-------------|
//! | `table` | Yes | | Table name |
//! | `schema` | No | none | Schema prefix |
//! | `name` | No | struct name | Registry key |
//! | `crate` | No | `sqlforge` | Path to the runtime crate |
//!
//! ## Field-Level
//!
//! | Attribute | Effect |
//! |-----------|--------|
//! | `#[id]` | Primary key; exactly one per entity |
//! | `#[column(name = "...")]` | Column name, defaults to the field name |
//! | `#[column(insertable = false)]` | Never written by INSERT |
//! | `#[column(updatable = false)]` | Never written by UPDATE |
//! | `#[column(nullable)]` / `nullable = false` | NULL handling; defaults to `Option` fields |
//! | `#[column(kind = "large_text")]` | Override the inferred `DataKind` |
//! | `#[column(lenient)]` | Keep the default instead of failing on bad values |
//! | `#[column(skip)]` | Transient field, never persisted |
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlforge::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(table = "users", schema = "app")]
//! pub struct User {
//!     #[id]
//!     pub id: Option<i64>,
//!     #[column(name = "user_name", nullable = false)]
//!     pub name: Option<String>,
//!     pub status: Option<Status>,
//!     #[column(skip)]
//!     pub cached: Vec<String>
//! }
//!
//! assert_eq!(User::descriptor().qualified_table(), "app.users");
//! ```
//!
//! # Field Kinds
//!
//! | Rust type | `DataKind` |
//! |-----------|------------|
//! | `String`, `&str` | `Text` |
//! | `i8`..`i64`, `u8`..`u32` | `Integer` |
//! | `f32`, `f64`, `Decimal` | `Decimal` |
//! | `NaiveDate` | `Date` |
//! | `NaiveDateTime`, `DateTime<Utc>` | `DateTime` |
//! | `bool` | `Boolean` |
//! | `Uuid` | `Uuid` |
//! | `Vec<u8>` | `Bytes` |
//! | anything else | `Enum` (`Display` + `FromStr`) |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

mod entity;

use proc_macro::TokenStream;

/// Derive `Entity` for a struct with named fields.
///
/// See the [crate documentation](crate) for attributes.
#[proc_macro_derive(Entity, attributes(entity, id, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive(input)
}
