// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! INSERT, UPDATE and DELETE synthesis.
//!
//! # Column Selection
//!
//! | Statement | Columns | NULL field |
//! |-----------|---------|------------|
//! | INSERT | `insertable`, declaration order | skipped ([`NullPolicy::Skip`]) or bound as NULL ([`NullPolicy::Explicit`]) |
//! | UPDATE | `updatable`, non-key, declaration order | same as INSERT |
//! | DELETE | primary key only | [`Error::MissingPrimaryKey`] |
//!
//! The primary key is never part of an UPDATE SET list; it is always the
//! last parameter, in the WHERE clause.
//!
//! # Generated Keys
//!
//! A NULL primary key of an auto-numeric kind (`Integer`, `Decimal`) is left
//! out of the INSERT and the dialect's returning clause is added instead. Any
//! other primary key must be supplied by the caller.
//!
//! ```rust,ignore
//! let user = Record::new().with("name", "Alice");
//! let stmt = Synthesizer::new(&users, Dialect::Postgres).insert(&user)?;
//! assert_eq!(stmt.sql(), "INSERT INTO users (name) VALUES ($1) RETURNING id");
//! ```

use tracing::{debug, trace};

use crate::{
    builder::{BindSource, GeneratedKey, SqlBuilder, Statement},
    dialect::Dialect,
    entity::{Entity, FieldSource},
    error::{Error, Result},
    metadata::{ColumnDescriptor, EntityDescriptor},
    value::Value
};

/// Treatment of NULL field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// Leave NULL columns out of the statement.
    #[default]
    Skip,

    /// Bind every column, NULL included.
    ///
    /// A NULL auto-numeric primary key is left to the database without a
    /// returning clause; a supplied one is bound like any other column.
    Explicit
}

/// Statement synthesizer bound to one entity and dialect.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    descriptor: &'a EntityDescriptor,
    dialect:    Dialect,
    policy:     NullPolicy
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer with [`NullPolicy::Skip`].
    #[must_use]
    pub const fn new(descriptor: &'a EntityDescriptor, dialect: Dialect) -> Self {
        Self {
            descriptor,
            dialect,
            policy: NullPolicy::Skip
        }
    }

    /// Change the NULL policy.
    #[must_use]
    pub const fn null_policy(mut self, policy: NullPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build an INSERT.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingPrimaryKey`] for a NULL key that cannot be generated
    /// - [`Error::MissingRequiredColumn`] for a NULL non-nullable column
    /// - [`Error::Config`] when the descriptor has no single primary key
    pub fn insert(&self, source: &dyn FieldSource) -> Result<Statement> {
        let pk = self.descriptor.primary_key()?;
        let mut included: Vec<(&ColumnDescriptor, Value)> = Vec::new();
        let mut generate_key = false;

        for column in &self.descriptor.columns {
            let value = source.field_value(&column.field_name);

            if column.primary_key {
                if column.kind.is_auto_numeric() && (value.is_null() || !column.insertable) {
                    generate_key = self.policy == NullPolicy::Skip;
                    trace!(column = %column.db_name, "primary key left to the database");
                    continue;
                }
                if !column.insertable {
                    continue;
                }
                if value.is_null() {
                    return Err(self.missing_key());
                }
                included.push((column, value));
                continue;
            }

            if !column.insertable {
                continue;
            }
            if value.is_null() {
                if !column.nullable {
                    return Err(Error::MissingRequiredColumn {
                        entity: self.descriptor.name.clone(),
                        column: column.field_name.clone()
                    });
                }
                if self.policy == NullPolicy::Skip {
                    trace!(column = %column.db_name, "null column skipped");
                    continue;
                }
            }
            included.push((column, value));
        }

        let mut b = SqlBuilder::new(self.dialect);
        b.push(format!("INSERT INTO {}", self.descriptor.qualified_table()));
        let output = generate_key
            .then(|| self.dialect.output_clause(&pk.db_name))
            .flatten();

        if included.is_empty() {
            if let Some(output) = &output {
                b.push(format!(" {output}"));
            }
            b.push(format!(" {}", self.dialect.empty_insert_body(&pk.db_name)));
        } else {
            let names: Vec<&str> = included.iter().map(|(c, _)| c.db_name.as_str()).collect();
            b.push(format!(" ({})", names.join(", ")));
            if let Some(output) = &output {
                b.push(format!(" {output}"));
            }
            b.push(" VALUES (");
            for (index, (column, value)) in included.into_iter().enumerate() {
                if index > 0 {
                    b.push(", ");
                }
                b.bind_typed(
                    BindSource::Field(column.field_name.clone()),
                    value,
                    Some(column.kind)
                );
            }
            b.push(")");
        }

        if generate_key {
            self.dialect.append_returning(&mut b, &pk.db_name);
        }

        let mut stmt = b.finish();
        if generate_key {
            stmt = stmt.with_generated_key(GeneratedKey {
                field:    pk.field_name.clone(),
                column:   pk.db_name.clone(),
                strategy: self.dialect.key_strategy()
            });
        }
        debug!(
            entity = %self.descriptor.name,
            dialect = %self.dialect,
            params = stmt.bindings().len(),
            "synthesized insert"
        );
        Ok(stmt)
    }

    /// Build an UPDATE keyed by primary key.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingPrimaryKey`] when the key is NULL
    /// - [`Error::MissingRequiredColumn`] for a NULL non-nullable column
    ///   under [`NullPolicy::Explicit`]
    /// - [`Error::EmptyUpdate`] when no column is left to SET
    pub fn update(&self, source: &dyn FieldSource) -> Result<Statement> {
        let pk = self.descriptor.primary_key()?;
        let key = source.field_value(&pk.field_name);
        if key.is_null() {
            return Err(self.missing_key());
        }

        let mut b = SqlBuilder::new(self.dialect);
        b.push(format!("UPDATE {} SET ", self.descriptor.qualified_table()));

        let mut assigned = 0usize;
        for column in &self.descriptor.columns {
            if column.primary_key || !column.updatable {
                continue;
            }
            let value = source.field_value(&column.field_name);
            if value.is_null() {
                if self.policy == NullPolicy::Skip {
                    trace!(column = %column.db_name, "null column skipped");
                    continue;
                }
                if !column.nullable {
                    return Err(Error::MissingRequiredColumn {
                        entity: self.descriptor.name.clone(),
                        column: column.field_name.clone()
                    });
                }
            }
            if assigned > 0 {
                b.push(", ");
            }
            b.push(format!("{} = ", column.db_name));
            b.bind_typed(
                BindSource::Field(column.field_name.clone()),
                value,
                Some(column.kind)
            );
            assigned += 1;
        }

        if assigned == 0 {
            return Err(Error::EmptyUpdate {
                entity: self.descriptor.name.clone()
            });
        }

        b.push(format!(" WHERE {} = ", pk.db_name));
        b.bind_typed(BindSource::Field(pk.field_name.clone()), key, Some(pk.kind));

        let stmt = b.finish();
        debug!(
            entity = %self.descriptor.name,
            dialect = %self.dialect,
            params = stmt.bindings().len(),
            "synthesized update"
        );
        Ok(stmt)
    }

    /// Build a DELETE keyed by primary key.
    ///
    /// # Errors
    ///
    /// [`Error::MissingPrimaryKey`] when the key is NULL.
    pub fn delete(&self, source: &dyn FieldSource) -> Result<Statement> {
        let pk = self.descriptor.primary_key()?;
        let key = source.field_value(&pk.field_name);
        if key.is_null() {
            return Err(self.missing_key());
        }

        let mut b = SqlBuilder::new(self.dialect);
        b.push(format!(
            "DELETE FROM {} WHERE {} = ",
            self.descriptor.qualified_table(),
            pk.db_name
        ));
        b.bind_typed(BindSource::Field(pk.field_name.clone()), key, Some(pk.kind));
        Ok(b.finish())
    }

    fn missing_key(&self) -> Error {
        Error::MissingPrimaryKey {
            entity: self.descriptor.name.clone(),
            column: self
                .descriptor
                .primary_key()
                .map(|pk| pk.field_name.clone())
                .unwrap_or_default()
        }
    }
}

/// Null-skipping INSERT for an entity.
///
/// # Errors
///
/// See [`Synthesizer::insert`].
pub fn synthesize_insert<E: Entity>(entity: &E, dialect: Dialect) -> Result<Statement> {
    Synthesizer::new(E::descriptor(), dialect).insert(entity)
}

/// Null-skipping UPDATE for an entity.
///
/// # Errors
///
/// See [`Synthesizer::update`].
pub fn synthesize_update<E: Entity>(entity: &E, dialect: Dialect) -> Result<Statement> {
    Synthesizer::new(E::descriptor(), dialect).update(entity)
}

/// DELETE for an entity.
///
/// # Errors
///
/// See [`Synthesizer::delete`].
pub fn synthesize_delete<E: Entity>(entity: &E, dialect: Dialect) -> Result<Statement> {
    Synthesizer::new(E::descriptor(), dialect).delete(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dialect::KeyStrategy,
        entity::Record,
        metadata::{ColumnDescriptor, DataKind}
    };

    fn users() -> EntityDescriptor {
        EntityDescriptor::new("User", "users")
            .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key())
            .with_column(ColumnDescriptor::new("name", DataKind::Text).nullable(false))
            .with_column(ColumnDescriptor::new("email", DataKind::Text))
            .with_column(
                ColumnDescriptor::new("created_at", DataKind::DateTime)
                    .insertable(false)
                    .updatable(false)
            )
    }

    fn tokens() -> EntityDescriptor {
        EntityDescriptor::new("Token", "tokens")
            .with_schema("auth")
            .with_column(ColumnDescriptor::new("code", DataKind::Text).primary_key())
            .with_column(ColumnDescriptor::new("owner", DataKind::Text))
    }

    #[test]
    fn insert_skips_null_columns() {
        let d = users();
        let alice = Record::new().with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::MySql).insert(&alice).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO users (name) VALUES (?)");
        assert_eq!(stmt.bindings().fields(), vec!["name"]);
    }

    #[test]
    fn insert_never_binds_non_insertable() {
        let d = users();
        let row = Record::new()
            .with("name", "Alice")
            .with("created_at", Value::Text("now".into()));
        let stmt = Synthesizer::new(&d, Dialect::MySql).insert(&row).unwrap();
        assert!(!stmt.sql().contains("created_at"));
    }

    #[test]
    fn insert_required_column_missing() {
        let d = users();
        let err = Synthesizer::new(&d, Dialect::Postgres)
            .insert(&Record::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredColumn { ref column, .. } if column == "name"));
    }

    #[test]
    fn insert_postgres_returning() {
        let d = users();
        let row = Record::new().with("name", "Alice").with("email", "a@x.io");
        let stmt = Synthesizer::new(&d, Dialect::Postgres).insert(&row).unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id"
        );
        assert_eq!(
            stmt.generated_key().map(|k| k.strategy),
            Some(KeyStrategy::ReturningClause)
        );
    }

    #[test]
    fn insert_sqlserver_output_inserted() {
        let d = users();
        let row = Record::new().with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::SqlServer).insert(&row).unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO users (name) OUTPUT INSERTED.id VALUES (@p1)"
        );
    }

    #[test]
    fn insert_oracle_returning_into() {
        let d = users();
        let row = Record::new().with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::Oracle).insert(&row).unwrap();
        assert!(stmt.sql().ends_with("RETURNING id INTO ?"));
        assert_eq!(stmt.bindings().len(), 2);
        assert_eq!(stmt.bindings().out_positions(), vec![2]);
        assert_eq!(stmt.bindings().values(), vec![Value::Text("Alice".into())]);
    }

    #[test]
    fn insert_mysql_has_no_clause() {
        let d = users();
        let row = Record::new().with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::MySql).insert(&row).unwrap();
        assert!(!stmt.sql().contains("RETURNING"));
        assert_eq!(
            stmt.generated_key().map(|k| k.strategy),
            Some(KeyStrategy::LastInsertIdQuery)
        );
    }

    #[test]
    fn insert_supplied_numeric_key_is_bound() {
        let d = users();
        let row = Record::new().with("id", 9).with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::Postgres).insert(&row).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO users (id, name) VALUES ($1, $2)");
        assert!(stmt.generated_key().is_none());
    }

    #[test]
    fn insert_text_key_required() {
        let d = tokens();
        let err = Synthesizer::new(&d, Dialect::Postgres)
            .insert(&Record::new().with("owner", "bob"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey { .. }));
    }

    #[test]
    fn insert_text_key_with_schema() {
        let d = tokens();
        let row = Record::new().with("code", "abc");
        let stmt = Synthesizer::new(&d, Dialect::Postgres).insert(&row).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO auth.tokens (code) VALUES ($1)");
    }

    #[test]
    fn insert_explicit_binds_nulls() {
        let d = users();
        let row = Record::new().with("id", 4).with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::Postgres)
            .null_policy(NullPolicy::Explicit)
            .insert(&row)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3)"
        );
        assert_eq!(
            stmt.bindings().values(),
            vec![Value::Int(4), Value::Text("Alice".into()), Value::Null]
        );
        assert!(stmt.generated_key().is_none());
    }

    #[test]
    fn insert_explicit_null_key_left_to_database() {
        let d = users();
        let row = Record::new().with("name", "Alice");
        let stmt = Synthesizer::new(&d, Dialect::Postgres)
            .null_policy(NullPolicy::Explicit)
            .insert(&row)
            .unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO users (name, email) VALUES ($1, $2)");
        assert!(stmt.generated_key().is_none());
    }

    #[test]
    fn insert_everything_null() {
        let d = EntityDescriptor::new("Tick", "ticks")
            .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key());
        let pg = Synthesizer::new(&d, Dialect::Postgres).insert(&Record::new()).unwrap();
        assert_eq!(pg.sql(), "INSERT INTO ticks DEFAULT VALUES RETURNING id");
        let ms = Synthesizer::new(&d, Dialect::SqlServer).insert(&Record::new()).unwrap();
        assert_eq!(ms.sql(), "INSERT INTO ticks OUTPUT INSERTED.id DEFAULT VALUES");
    }

    #[test]
    fn update_key_last() {
        let d = users();
        let row = Record::new().with("id", 7).with("name", "Bob").with("email", "b@x.io");
        let stmt = Synthesizer::new(&d, Dialect::Postgres).update(&row).unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE users SET name = $1, email = $2 WHERE id = $3"
        );
        assert_eq!(stmt.bindings().fields(), vec!["name", "email", "id"]);
    }

    #[test]
    fn update_skips_nulls() {
        let d = users();
        let row = Record::new().with("id", 7).with("name", "Bob");
        let stmt = Synthesizer::new(&d, Dialect::SqlServer).update(&row).unwrap();
        assert_eq!(stmt.sql(), "UPDATE users SET name = @p1 WHERE id = @p2");
    }

    #[test]
    fn update_without_key() {
        let d = users();
        let err = Synthesizer::new(&d, Dialect::Postgres)
            .update(&Record::new().with("name", "Bob"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey { ref column, .. } if column == "id"));
    }

    #[test]
    fn update_nothing_to_set() {
        let d = users();
        let err = Synthesizer::new(&d, Dialect::Postgres)
            .update(&Record::new().with("id", 1))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyUpdate { .. }));
    }

    #[test]
    fn update_explicit_required_null() {
        let d = users();
        let err = Synthesizer::new(&d, Dialect::Postgres)
            .null_policy(NullPolicy::Explicit)
            .update(&Record::new().with("id", 1))
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredColumn { .. }));
    }

    #[test]
    fn delete_by_key() {
        let d = users();
        let stmt = Synthesizer::new(&d, Dialect::Oracle)
            .delete(&Record::new().with("id", 3))
            .unwrap();
        assert_eq!(stmt.sql(), "DELETE FROM users WHERE id = ?");
        assert_eq!(stmt.bindings().values(), vec![Value::Int(3)]);
    }

    #[test]
    fn delete_without_key() {
        let d = users();
        let err = Synthesizer::new(&d, Dialect::Oracle)
            .delete(&Record::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey { .. }));
    }

    #[test]
    fn descriptor_without_key_is_config_error() {
        let d = EntityDescriptor::new("Log", "logs")
            .with_column(ColumnDescriptor::new("line", DataKind::Text));
        let err = Synthesizer::new(&d, Dialect::Postgres)
            .insert(&Record::new())
            .unwrap_err();
        assert!(err.is_config());
    }
}
