// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity derive macro implementation.
//!
//! # Architecture
//!
//! ```text
//! entity.rs (orchestrator)
//! │
//! ├── parse/          → Attribute parsing (EntityDef, FieldDef)
//! │
//! ├── descriptor.rs   → Static EntityDescriptor
//! └── accessors.rs    → get/set by field name
//! ```
//!
//! # Generated Code
//!
//! ```rust,ignore
//! impl ::sqlforge::Entity for User {
//!     fn descriptor() -> &'static ::sqlforge::EntityDescriptor { /* LazyLock */ }
//!     fn get(&self, field: &str) -> ::sqlforge::Value { /* match */ }
//!     fn set(&mut self, field: &str, value: ::sqlforge::Value)
//!         -> Result<(), ::sqlforge::DecodeError> { /* match */ }
//! }
//! ```

mod accessors;
mod descriptor;
pub mod parse;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use self::parse::EntityDef;

/// Main entry point for the Entity derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match EntityDef::from_derive_input(&input) {
        Ok(entity) => generate(&entity).into(),
        Err(err) => err.write_errors().into()
    }
}

fn generate(entity: &EntityDef) -> TokenStream2 {
    let ident = &entity.ident;
    let krate = &entity.krate;
    let descriptor = descriptor::generate(entity);
    let get = accessors::generate_get(entity);
    let set = accessors::generate_set(entity);

    quote! {
        #[automatically_derived]
        impl #krate::Entity for #ident {
            #descriptor
            #get
            #set
        }
    }
}
