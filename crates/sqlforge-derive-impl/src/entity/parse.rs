// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Attribute parsing for entity definitions.
//!
//! # Architecture
//!
//! ```text
//! parse.rs (coordinator)
//! ├── entity.rs        - EntityDef, built from DeriveInput
//! │   └── attrs.rs     - #[entity(...)] via darling
//! └── field.rs         - FieldDef, built from syn::Field
//!     ├── column.rs    - #[column(...)]
//!     └── kind.rs      - DataKind inference from the Rust type
//! ```

mod entity;
mod field;

pub use entity::EntityDef;
pub use field::{FieldDef, Kind};
