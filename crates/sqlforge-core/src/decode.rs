// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Row decoding and generated key extraction.
//!
//! # Column lookup
//!
//! For every column, [`decode_row`] tries `<ALIAS>_<COLUMN>` first (the shape
//! produced by joins that prefix columns with the table alias) and then the
//! bare column name. Lookups are case-insensitive. Columns missing from the
//! row keep the entity's default value.
//!
//! # Leniency
//!
//! | Column | Conversion failure |
//! |--------|--------------------|
//! | `lenient` | `warn!`, field keeps its default |
//! | strict | [`Error::Decode`] |
//!
//! # Generated keys
//!
//! Each dialect returns a generated key through exactly one channel:
//!
//! | Dialect | Channel |
//! |---------|---------|
//! | Postgres | `RETURNING` row |
//! | MySQL | driver `last_insert_id` |
//! | SQL Server | `OUTPUT INSERTED` row |
//! | Oracle | OUT parameter |

use tracing::{trace, warn};

use crate::{
    dialect::{Dialect, KeyStrategy},
    entity::Entity,
    error::{DecodeError, Error, Result},
    metadata::{DataKind, EntityDescriptor},
    value::{FromValue, Value, read_large_text}
};

/// One result row as ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>
}

impl Row {
    /// Empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new()
        }
    }

    /// Append a column, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Append a column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Value of a column, matched case-insensitively.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Value at a 0-based position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect()
        }
    }
}

/// Caller-supplied row callback used instead of the entity decoder.
///
/// Closures `Fn(&Row) -> Result<()>` implement it directly.
pub trait RowHandler: Send + Sync {
    /// Process one row.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining rows.
    fn handle(&self, row: &Row) -> Result<()>;
}

impl<F> RowHandler for F
where
    F: Fn(&Row) -> Result<()> + Send + Sync
{
    fn handle(&self, row: &Row) -> Result<()> {
        self(row)
    }
}

/// Everything a driver reports for one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    /// Rows changed.
    pub rows_affected:  u64,
    /// Rows returned (`RETURNING`, `OUTPUT`, or a query).
    pub rows:           Vec<Row>,
    /// Driver side channel for the last generated identity.
    pub last_insert_id: Option<Value>,
    /// OUT parameter values in placeholder order.
    pub out_params:     Vec<Value>
}

impl ExecutionResult {
    /// Result carrying only an affected-row count.
    #[must_use]
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }
}

/// Map one row into a fresh entity.
///
/// # Errors
///
/// [`Error::Decode`] when a strict column fails to convert.
pub fn decode_row<E: Entity>(row: &Row, dialect: Dialect) -> Result<E> {
    let descriptor = E::descriptor();
    let alias = descriptor.alias().to_uppercase();
    let mut entity = E::default();

    for column in &descriptor.columns {
        let prefixed = format!("{alias}_{}", column.db_name);
        let Some(raw) = row.get(&prefixed).or_else(|| row.get(&column.db_name)) else {
            trace!(column = %column.db_name, "column absent from row");
            continue;
        };

        let converted = convert(raw.clone(), column.kind, column.nullable, dialect)
            .and_then(|value| entity.set(&column.field_name, value));
        if let Err(source) = converted {
            if column.lenient {
                warn!(
                    entity = %descriptor.name,
                    column = %column.db_name,
                    error = %source,
                    "lenient column left at default"
                );
                continue;
            }
            return Err(Error::Decode {
                column: column.db_name.clone(),
                source
            });
        }
    }

    Ok(entity)
}

/// Decode every row.
///
/// # Errors
///
/// First row failure from [`decode_row`].
pub fn decode_rows<E: Entity>(rows: &[Row], dialect: Dialect) -> Result<Vec<E>> {
    rows.iter().map(|row| decode_row(row, dialect)).collect()
}

/// Read a `COUNT(...)` result; no rows counts as zero.
///
/// # Errors
///
/// [`Error::Decode`] when the first column is not an integer.
pub fn decode_count(rows: &[Row]) -> Result<u64> {
    let Some(value) = rows.first().and_then(|row| row.get_index(0)) else {
        return Ok(0);
    };
    u64::try_from(
        i64::from_value(value.clone()).map_err(|source| Error::Decode {
            column: "count".into(),
            source
        })?
    )
    .map_err(|_| Error::Decode {
        column: "count".into(),
        source: DecodeError::Parse {
            expected: "u64",
            input:    format!("{value:?}")
        }
    })
}

fn convert(
    raw: Value,
    kind: DataKind,
    nullable: bool,
    dialect: Dialect
) -> Result<Value, DecodeError> {
    let value = match kind {
        DataKind::LargeText => read_large_text(raw)?,
        _ => raw
    };
    let text_like = matches!(kind, DataKind::Text | DataKind::LargeText);
    if value.is_null() && text_like && !nullable && dialect.empty_string_is_null() {
        return Ok(Value::Text(String::new()));
    }
    Ok(value)
}

/// Read the key the database generated for an INSERT.
///
/// Exactly one channel is consulted, picked by the dialect's key strategy.
///
/// # Errors
///
/// - [`Error::KeyExtractionFailed`] when that channel is empty or NULL
/// - [`Error::Config`] when the descriptor has no single primary key
pub fn extract_generated_key(
    result: &ExecutionResult,
    descriptor: &EntityDescriptor,
    dialect: Dialect
) -> Result<Value> {
    let pk = descriptor.primary_key()?;
    let failed = |reason: &str| Error::KeyExtractionFailed {
        column: pk.db_name.clone(),
        dialect,
        reason: reason.to_owned()
    };

    let value = match dialect.key_strategy() {
        KeyStrategy::ReturningClause | KeyStrategy::OutputInsertedClause => {
            let row = result
                .rows
                .first()
                .ok_or_else(|| failed("statement returned no row"))?;
            row.get(&pk.db_name)
                .or_else(|| (row.len() == 1).then(|| row.get_index(0)).flatten())
                .ok_or_else(|| failed("returned row has no key column"))?
        }
        KeyStrategy::LastInsertIdQuery => result
            .last_insert_id
            .as_ref()
            .ok_or_else(|| failed("driver reported no last insert id"))?,
        KeyStrategy::ReturningIntoBinding => result
            .out_params
            .first()
            .ok_or_else(|| failed("OUT parameter was not populated"))?
    };

    if value.is_null() {
        return Err(failed("generated key is NULL"));
    }
    trace!(column = %pk.db_name, %dialect, "generated key extracted");
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        LazyLock,
        atomic::{AtomicUsize, Ordering}
    };

    use super::*;
    use crate::{
        metadata::ColumnDescriptor,
        value::{enum_from_value, option_enum_from_value}
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Level {
        #[default]
        Low,
        High
    }

    impl std::str::FromStr for Level {
        type Err = ();

        fn from_str(s: &str) -> std::result::Result<Self, ()> {
            match s {
                "Low" => Ok(Self::Low),
                "High" => Ok(Self::High),
                _ => Err(())
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        id:      Option<i64>,
        name:    String,
        level:   Option<Level>,
        rank:    Level,
        balance: rust_decimal::Decimal,
        notes:   Option<String>
    }

    static ACCOUNT: LazyLock<EntityDescriptor> = LazyLock::new(|| {
        EntityDescriptor::new("Account", "bank_accounts")
            .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key())
            .with_column(ColumnDescriptor::new("name", DataKind::Text).nullable(false))
            .with_column(ColumnDescriptor::new("level", DataKind::Enum).lenient())
            .with_column(ColumnDescriptor::new("rank", DataKind::Enum))
            .with_column(ColumnDescriptor::new("balance", DataKind::Decimal))
            .with_column(ColumnDescriptor::new("notes", DataKind::LargeText))
    });

    impl Entity for Account {
        fn descriptor() -> &'static EntityDescriptor {
            &ACCOUNT
        }

        fn get(&self, field: &str) -> Value {
            match field {
                "id" => self.id.into(),
                "name" => self.name.clone().into(),
                "balance" => self.balance.into(),
                "notes" => self.notes.clone().into(),
                _ => Value::Null
            }
        }

        fn set(&mut self, field: &str, value: Value) -> Result<(), DecodeError> {
            match field {
                "id" => self.id = FromValue::from_value(value)?,
                "name" => self.name = FromValue::from_value(value)?,
                "level" => self.level = option_enum_from_value(value)?,
                "rank" => self.rank = enum_from_value(value)?,
                "balance" => self.balance = FromValue::from_value(value)?,
                "notes" => self.notes = FromValue::from_value(value)?,
                other => return Err(DecodeError::UnknownField(other.to_owned()))
            }
            Ok(())
        }
    }

    #[test]
    fn row_lookup_ignores_case() {
        let row = Row::new().with("NAME", "x");
        assert_eq!(row.get("name"), Some(&Value::Text("x".into())));
        assert_eq!(row.get_index(0), Some(&Value::Text("x".into())));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn decodes_full_row() {
        let row = Row::new()
            .with("id", 4_i64)
            .with("name", "Ann")
            .with("level", "High")
            .with("rank", "Low")
            .with("balance", "")
            .with("notes", Value::Bytes(b"long".to_vec()));
        let account: Account = decode_row(&row, Dialect::Postgres).unwrap();
        assert_eq!(account.id, Some(4));
        assert_eq!(account.level, Some(Level::High));
        assert_eq!(account.balance, rust_decimal::Decimal::ZERO);
        assert_eq!(account.notes.as_deref(), Some("long"));
    }

    #[test]
    fn alias_prefixed_column_wins() {
        let row = Row::new().with("name", "plain").with("BA_NAME", "prefixed");
        let account: Account = decode_row(&row, Dialect::MySql).unwrap();
        assert_eq!(account.name, "prefixed");
    }

    #[test]
    fn missing_columns_keep_defaults() {
        let account: Account = decode_row(&Row::new().with("id", 1), Dialect::Postgres).unwrap();
        assert_eq!(account.name, "");
        assert_eq!(account.level, None);
    }

    #[test]
    fn lenient_enum_keeps_default() {
        let row = Row::new().with("level", "Medium");
        let account: Account = decode_row(&row, Dialect::Postgres).unwrap();
        assert_eq!(account.level, None);
    }

    #[test]
    fn strict_enum_fails() {
        let row = Row::new().with("rank", "Medium");
        let err = decode_row::<Account>(&row, Dialect::Postgres).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                ref column,
                source: DecodeError::UnknownVariant(_)
            } if column == "rank"
        ));
    }

    #[test]
    fn strict_null_into_required_field_fails() {
        let row = Row::new().with("name", Value::Null);
        assert!(decode_row::<Account>(&row, Dialect::Postgres).is_err());
    }

    #[test]
    fn oracle_null_text_is_empty() {
        let row = Row::new().with("name", Value::Null);
        let account: Account = decode_row(&row, Dialect::Oracle).unwrap();
        assert_eq!(account.name, "");
    }

    #[test]
    fn handler_closure() {
        let seen = AtomicUsize::new(0);
        let handler = |row: &Row| -> Result<()> {
            seen.fetch_add(row.len(), Ordering::SeqCst);
            Ok(())
        };
        handler.handle(&Row::new().with("a", 1).with("b", 2)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn count_from_rows() {
        assert_eq!(decode_count(&[]).unwrap(), 0);
        assert_eq!(decode_count(&[Row::new().with("count", 42)]).unwrap(), 42);
        assert!(decode_count(&[Row::new().with("count", "many")]).is_err());
    }

    #[test]
    fn postgres_key_from_returning_row() {
        let result = ExecutionResult {
            rows: vec![Row::new().with("ID", 9)],
            ..ExecutionResult::affected(1)
        };
        assert_eq!(
            extract_generated_key(&result, &ACCOUNT, Dialect::Postgres).unwrap(),
            Value::Int(9)
        );
    }

    #[test]
    fn sqlserver_key_from_single_column_row() {
        let result = ExecutionResult {
            rows: vec![Row::new().with("", 11)],
            ..ExecutionResult::affected(1)
        };
        assert_eq!(
            extract_generated_key(&result, &ACCOUNT, Dialect::SqlServer).unwrap(),
            Value::Int(11)
        );
    }

    #[test]
    fn mysql_key_from_side_channel() {
        let result = ExecutionResult {
            last_insert_id: Some(Value::Int(3)),
            rows: vec![Row::new().with("id", 99)],
            ..ExecutionResult::affected(1)
        };
        assert_eq!(
            extract_generated_key(&result, &ACCOUNT, Dialect::MySql).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn oracle_key_from_out_param_not_row() {
        let result = ExecutionResult {
            rows: vec![Row::new().with("id", 99)],
            out_params: vec![Value::Int(21)],
            ..ExecutionResult::affected(1)
        };
        assert_eq!(
            extract_generated_key(&result, &ACCOUNT, Dialect::Oracle).unwrap(),
            Value::Int(21)
        );
    }

    #[test]
    fn every_dialect_fails_on_empty_result() {
        for dialect in Dialect::ALL {
            let err =
                extract_generated_key(&ExecutionResult::affected(1), &ACCOUNT, dialect).unwrap_err();
            assert!(
                matches!(err, Error::KeyExtractionFailed { dialect: d, .. } if d == dialect),
                "{dialect}"
            );
        }
    }

    #[test]
    fn null_key_fails() {
        let result = ExecutionResult {
            last_insert_id: Some(Value::Null),
            ..ExecutionResult::affected(1)
        };
        assert!(matches!(
            extract_generated_key(&result, &ACCOUNT, Dialect::MySql),
            Err(Error::KeyExtractionFailed { .. })
        ));
    }
}
