// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity metadata model.
//!
//! An [`EntityDescriptor`] is the static description of one persistent type:
//! its table, optional schema and ordered columns. Descriptors are built once
//! (usually by `#[derive(Entity)]`), validated on registration and never
//! mutated afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! let users = EntityDescriptor::new("User", "users")
//!     .with_schema("app")
//!     .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key())
//!     .with_column(ColumnDescriptor::new("name", DataKind::Text).nullable(false))
//!     .with_column(ColumnDescriptor::new("email", DataKind::Text));
//!
//! users.validate()?;
//! assert_eq!(users.qualified_table(), "app.users");
//! assert_eq!(users.alias(), "u");
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CodeGenError, Error};

/// SQL keywords that a generated table alias must not collide with.
const RESERVED_ALIASES: &[&str] = &[
    "as", "at", "by", "do", "go", "if", "in", "is", "no", "of", "on", "or", "to"
];

/// Storage category of a column.
///
/// Picks the conversion routine used when binding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Character data.
    Text,
    /// Any integer width.
    Integer,
    /// Exact or floating numeric.
    Decimal,
    /// Calendar date.
    Date,
    /// Timestamp.
    DateTime,
    /// Enum stored by member name.
    Enum,
    /// Character large object.
    LargeText,
    /// Binary data.
    Bytes,
    /// Boolean.
    Boolean,
    /// UUID.
    Uuid
}

impl DataKind {
    /// Check whether a primary key of this kind can be generated by the
    /// database and read back after insert.
    #[must_use]
    pub const fn is_auto_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }
}

/// Description of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Field name on the entity.
    pub field_name:  String,
    /// Column name in the database.
    pub db_name:     String,
    /// Primary key flag.
    pub primary_key: bool,
    /// Included in INSERT statements.
    pub insertable:  bool,
    /// Included in UPDATE SET lists.
    pub updatable:   bool,
    /// NULL is acceptable.
    pub nullable:    bool,
    /// Storage category.
    pub kind:        DataKind,
    /// Decode failures keep the zero value instead of failing the row.
    pub lenient:     bool
}

impl ColumnDescriptor {
    /// Create an insertable, updatable, nullable, strict column whose
    /// database name equals the field name.
    pub fn new(field_name: impl Into<String>, kind: DataKind) -> Self {
        let field_name = field_name.into();
        Self {
            db_name: field_name.clone(),
            field_name,
            primary_key: false,
            insertable: true,
            updatable: true,
            nullable: true,
            kind,
            lenient: false
        }
    }

    /// Override the database column name.
    #[must_use]
    pub fn db_name(mut self, name: impl Into<String>) -> Self {
        self.db_name = name.into();
        self
    }

    /// Mark as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Set whether the column takes part in INSERT.
    #[must_use]
    pub fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    /// Set whether the column takes part in UPDATE.
    #[must_use]
    pub fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Set whether NULL is acceptable.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Opt in to lenient decoding.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

/// Static description of a persistent type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Registry key, normally the Rust type name.
    pub name:    String,
    /// Table name, possibly dotted.
    pub table:   String,
    /// Schema prefix.
    pub schema:  Option<String>,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>
}

impl EntityDescriptor {
    /// Create a descriptor with no columns.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name:    name.into(),
            table:   table.into(),
            schema:  None,
            columns: Vec::new()
        }
    }

    /// Set the schema. Blank schemas are ignored.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.schema = (!schema.trim().is_empty()).then_some(schema);
        self
    }

    /// Append a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Check the registration invariants.
    ///
    /// # Errors
    ///
    /// - [`CodeGenError::MissingTableName`] for a blank table
    /// - [`CodeGenError::MissingPrimaryKeyColumn`] without a primary key
    /// - [`CodeGenError::DuplicatePrimaryKey`] with more than one
    /// - [`CodeGenError::DuplicateColumn`] for repeated field or column names
    pub fn validate(&self) -> Result<(), CodeGenError> {
        if self.table.trim().is_empty() {
            return Err(CodeGenError::MissingTableName {
                entity: self.name.clone()
            });
        }

        let mut fields = HashSet::new();
        let mut columns = HashSet::new();
        for column in &self.columns {
            if !fields.insert(column.field_name.as_str())
                || !columns.insert(column.db_name.to_lowercase())
            {
                return Err(CodeGenError::DuplicateColumn {
                    entity: self.name.clone(),
                    column: column.field_name.clone()
                });
            }
        }

        self.primary_key().map(|_| ())
    }

    /// The primary key column.
    ///
    /// # Errors
    ///
    /// Missing or duplicate primary key.
    pub fn primary_key(&self) -> Result<&ColumnDescriptor, CodeGenError> {
        let keys: Vec<&ColumnDescriptor> =
            self.columns.iter().filter(|c| c.primary_key).collect();
        match keys.as_slice() {
            [key] => Ok(key),
            [] => Err(CodeGenError::MissingPrimaryKeyColumn {
                entity: self.name.clone()
            }),
            many => Err(CodeGenError::DuplicatePrimaryKey {
                entity:  self.name.clone(),
                columns: many.iter().map(|c| c.db_name.clone()).collect()
            })
        }
    }

    /// Table name with schema applied.
    ///
    /// With a schema, only the last dot-separated segment of the table is
    /// kept, so `("app", "legacy.users")` becomes `app.users`.
    #[must_use]
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => {
                let table = self.table.rsplit('.').next().unwrap_or(&self.table);
                format!("{schema}.{table}")
            }
            None => self.table.clone()
        }
    }

    /// Short table alias.
    ///
    /// First letter of every `_`-separated word of the lowercase table name
    /// (schema stripped). Aliases that collide with SQL keywords get a `1`
    /// suffix.
    #[must_use]
    pub fn alias(&self) -> String {
        let table = self.table.rsplit('.').next().unwrap_or(&self.table);
        let mut alias: String = table
            .to_lowercase()
            .split('_')
            .filter_map(|word| word.chars().next())
            .collect();
        if alias.is_empty() {
            alias.push('t');
        }
        if RESERVED_ALIASES.contains(&alias.as_str()) {
            alias.push('1');
        }
        alias
    }

    /// `alias.column` list of every column, in declaration order.
    #[must_use]
    pub fn select_list(&self) -> String {
        let alias = self.alias();
        self.columns
            .iter()
            .map(|c| format!("{alias}.{}", c.db_name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Look up a column by field name.
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field_name == field)
    }

    /// Look up a column by field name, falling back to a case-insensitive
    /// match on the database name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownField`] when neither matches.
    pub fn column_for(&self, field: &str) -> Result<&ColumnDescriptor, Error> {
        self.column(field)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|c| c.db_name.eq_ignore_ascii_case(field))
            })
            .ok_or_else(|| Error::UnknownField {
                entity: self.name.clone(),
                field:  field.to_owned()
            })
    }
}
