// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Static descriptor generation.
//!
//! The descriptor is built on first use and cached in a `LazyLock`:
//!
//! ```rust,ignore
//! fn descriptor() -> &'static ::sqlforge::EntityDescriptor {
//!     static DESCRIPTOR: LazyLock<EntityDescriptor> = LazyLock::new(|| {
//!         EntityDescriptor::new("User", "users")
//!             .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key())
//!             .with_column(ColumnDescriptor::new("name", DataKind::Text).db_name("user_name"))
//!     });
//!     &DESCRIPTOR
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef};

/// Generate `Entity::descriptor`.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let krate = &entity.krate;
    let name = &entity.name;
    let table = &entity.table;
    let schema = entity
        .schema
        .as_ref()
        .map(|schema| quote!(.with_schema(#schema)));
    let columns = entity.persistent_fields().map(|field| column(field, krate));

    quote! {
        fn descriptor() -> &'static #krate::EntityDescriptor {
            static DESCRIPTOR: ::std::sync::LazyLock<#krate::EntityDescriptor> =
                ::std::sync::LazyLock::new(|| {
                    #krate::EntityDescriptor::new(#name, #table)
                        #schema
                        #(.with_column(#columns))*
                });
            &DESCRIPTOR
        }
    }
}

fn column(field: &FieldDef, krate: &syn::Path) -> TokenStream {
    let field_name = field.name();
    let kind = field.kind.runtime_tokens(krate);
    let db_name = field.column.name.as_ref().map(|name| quote!(.db_name(#name)));
    let primary_key = field.is_id.then(|| quote!(.primary_key()));
    let insertable = (!field.column.insertable).then(|| quote!(.insertable(false)));
    let updatable = (!field.column.updatable).then(|| quote!(.updatable(false)));
    let nullable = field.nullable();
    let lenient = field.column.lenient.then(|| quote!(.lenient()));

    quote! {
        #krate::ColumnDescriptor::new(#field_name, #kind)
            #db_name
            #primary_key
            #insertable
            #updatable
            .nullable(#nullable)
            #lenient
    }
}

#[cfg(test)]
mod tests {
    use syn::{DeriveInput, parse_quote};

    use super::*;

    fn expand(input: DeriveInput) -> String {
        generate(&EntityDef::from_derive_input(&input).unwrap()).to_string()
    }

    #[test]
    fn table_schema_and_name() {
        let tokens = expand(parse_quote! {
            #[entity(table = "bank_accounts", schema = "ledger", name = "Account")]
            pub struct BankAccount {
                #[id]
                pub id: Option<i64>
            }
        });
        assert!(tokens.contains("EntityDescriptor :: new (\"Account\" , \"bank_accounts\")"));
        assert!(tokens.contains("with_schema (\"ledger\")"));
        assert!(tokens.contains("LazyLock"));
    }

    #[test]
    fn column_builders() {
        let tokens = expand(parse_quote! {
            #[entity(table = "users")]
            pub struct User {
                #[id]
                pub id: Option<i64>,
                #[column(name = "user_name", updatable = false, lenient)]
                pub name: String
            }
        });
        assert!(tokens.contains("ColumnDescriptor :: new (\"id\" , :: sqlforge :: DataKind :: Integer) . primary_key ()"));
        assert!(tokens.contains(". db_name (\"user_name\")"));
        assert!(tokens.contains(". updatable (false)"));
        assert!(tokens.contains(". nullable (false) . lenient ()"));
        assert!(!tokens.contains(". insertable (false)"));
    }

    #[test]
    fn transient_fields_have_no_column() {
        let tokens = expand(parse_quote! {
            #[entity(table = "users")]
            pub struct User {
                #[id]
                pub id: Option<i64>,
                #[column(skip)]
                pub cache: Vec<String>
            }
        });
        assert!(!tokens.contains("\"cache\""));
    }
}
