// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! By-name field access for the synthesizer and decoder.
//!
//! | Kind | `get` | `set` |
//! |------|-------|-------|
//! | `Enum` | `enum_to_value` (`Display`) | `enum_from_value` (`FromStr`) |
//! | other | `ToValue` | `FromValue` |
//!
//! Transient fields are invisible: `get` reads NULL and `set` rejects them.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, Kind};

/// Generate `Entity::get`.
pub fn generate_get(entity: &EntityDef) -> TokenStream {
    let krate = &entity.krate;
    let arms = entity.persistent_fields().map(|field| {
        let name = field.name();
        let ident = &field.ident;
        let read = match (field.kind, field.is_option) {
            (Kind::Enum, true) => quote!(#krate::__private::option_enum_to_value(&self.#ident)),
            (Kind::Enum, false) => quote!(#krate::__private::enum_to_value(&self.#ident)),
            _ => quote!(#krate::ToValue::to_value(&self.#ident))
        };
        quote!(#name => #read,)
    });

    quote! {
        fn get(&self, field: &str) -> #krate::Value {
            match field {
                #(#arms)*
                _ => #krate::Value::Null
            }
        }
    }
}

/// Generate `Entity::set`.
pub fn generate_set(entity: &EntityDef) -> TokenStream {
    let krate = &entity.krate;
    let arms = entity.persistent_fields().map(|field| {
        let name = field.name();
        let ident = &field.ident;
        let ty = &field.ty;
        let convert = match (field.kind, field.is_option) {
            (Kind::Enum, true) => quote!(#krate::__private::option_enum_from_value(value)?),
            (Kind::Enum, false) => quote!(#krate::__private::enum_from_value(value)?),
            _ => quote!(<#ty as #krate::FromValue>::from_value(value)?)
        };
        quote!(#name => self.#ident = #convert,)
    });

    quote! {
        fn set(
            &mut self,
            field: &str,
            value: #krate::Value
        ) -> ::core::result::Result<(), #krate::DecodeError> {
            match field {
                #(#arms)*
                _ => {
                    return ::core::result::Result::Err(#krate::DecodeError::UnknownField(
                        ::std::string::ToString::to_string(field)
                    ));
                }
            }
            ::core::result::Result::Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::{DeriveInput, parse_quote};

    use super::*;

    fn entity() -> EntityDef {
        let input: DeriveInput = parse_quote! {
            #[entity(table = "orders")]
            pub struct Order {
                #[id]
                pub id: Option<i64>,
                pub status: Option<OrderStatus>,
                pub kind: OrderKind,
                #[column(skip)]
                pub note: String
            }
        };
        EntityDef::from_derive_input(&input).unwrap()
    }

    #[test]
    fn get_arms() {
        let tokens = generate_get(&entity()).to_string();
        assert!(tokens.contains("\"id\" => :: sqlforge :: ToValue :: to_value (& self . id)"));
        assert!(tokens.contains("option_enum_to_value (& self . status)"));
        assert!(tokens.contains(":: enum_to_value (& self . kind)"));
        assert!(!tokens.contains("\"note\""));
    }

    #[test]
    fn set_arms() {
        let tokens = generate_set(&entity()).to_string();
        assert!(tokens.contains("< Option < i64 > as :: sqlforge :: FromValue > :: from_value (value) ?"));
        assert!(tokens.contains("option_enum_from_value (value) ?"));
        assert!(tokens.contains("UnknownField"));
        assert!(!tokens.contains("self . note"));
    }
}
