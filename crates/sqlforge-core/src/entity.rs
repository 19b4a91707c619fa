// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity access traits.
//!
//! The synthesizer reads field values through [`FieldSource`]; the decoder
//! writes them back through [`Entity::set`]. `#[derive(Entity)]` implements
//! [`Entity`] for annotated structs, and [`Record`] covers dynamic rows that
//! have no Rust type.

use std::collections::BTreeMap;

use crate::{error::DecodeError, metadata::EntityDescriptor, value::Value};

/// Read access to field values by name.
pub trait FieldSource {
    /// Current value of a field; unknown fields read as NULL.
    fn field_value(&self, field: &str) -> Value;
}

/// A persistent type with static metadata.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default, Entity)]
/// #[entity(table = "users")]
/// pub struct User {
///     #[id]
///     pub id: Option<i64>,
///     #[column(nullable = false)]
///     pub name: Option<String>,
///     pub email: Option<String>
/// }
///
/// let user = User::default();
/// assert_eq!(User::descriptor().table, "users");
/// assert!(user.get("id").is_null());
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    /// Static metadata describing table and columns.
    fn descriptor() -> &'static EntityDescriptor;

    /// Read a field by name.
    fn get(&self, field: &str) -> Value;

    /// Write a field by name.
    ///
    /// # Errors
    ///
    /// [`DecodeError`] when the value does not fit the field type or the
    /// field does not exist.
    fn set(&mut self, field: &str, value: Value) -> Result<(), DecodeError>;
}

impl<E: Entity> FieldSource for E {
    fn field_value(&self, field: &str) -> Value {
        self.get(field)
    }
}

/// Field values keyed by field name.
///
/// Useful when the entity shape is only known at runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, Value>
}

impl Record {
    /// Empty record; every field reads as NULL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, builder style.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), value.into());
    }

    /// Read a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}

impl FieldSource for Record {
    fn field_value(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or_default()
    }
}
