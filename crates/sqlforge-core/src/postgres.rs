// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! PostgreSQL executor backed by `sqlx::PgPool`.
//!
//! Enabled with the `postgres` feature.
//!
//! | Value | Bound as | NULL typed by |
//! |-------|----------|---------------|
//! | `Int` | `INT8` | `DataKind::Integer` |
//! | `Decimal` | `NUMERIC` | `DataKind::Decimal` |
//! | `Text` | `TEXT` | `Text`, `LargeText`, `Enum` |
//! | `DateTime` | `TIMESTAMP` | `DataKind::DateTime` |
//!
//! Batches run inside one transaction, so a failing row rolls back the rows
//! before it.
//!
//! ```rust,ignore
//! let pool = PgPool::connect(&url).await?;
//! let session = Session::new(PgExecutor::new(pool), Dialect::Postgres);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{
    Column as _, PgPool, Postgres, Row as _, TypeInfo as _, ValueRef as _,
    postgres::{PgArguments, PgRow},
    query::Query
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    builder::{BindingPlan, Statement},
    decode::Row,
    error::{Error, Result},
    executor::Executor,
    metadata::DataKind,
    value::Value
};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// [`Executor`] over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool
}

impl PgExecutor {
    /// Wrap a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool
        }
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Executor for PgExecutor {
    #[instrument(skip_all, fields(sql = %statement.sql()))]
    async fn execute(&self, statement: &Statement) -> Result<u64> {
        let done = bind_all(statement.sql(), statement.bindings())
            .execute(&self.pool)
            .await
            .map_err(Error::execution)?;
        Ok(done.rows_affected())
    }

    #[instrument(skip_all, fields(sql = %statement.sql()))]
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>> {
        let rows = bind_all(statement.sql(), statement.bindings())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::execution)?;
        debug!(rows = rows.len(), "fetched");
        rows.iter().map(convert_row).collect()
    }

    async fn execute_batch(&self, sql: &str, rows: &[BindingPlan]) -> Result<Vec<u64>> {
        let mut tx = self.pool.begin().await.map_err(Error::execution)?;
        let mut counts = Vec::with_capacity(rows.len());
        for plan in rows {
            let done = bind_all(sql, plan)
                .execute(&mut *tx)
                .await
                .map_err(Error::execution)?;
            counts.push(done.rows_affected());
        }
        tx.commit().await.map_err(Error::execution)?;
        Ok(counts)
    }
}

fn bind_all<'q>(sql: &'q str, plan: &BindingPlan) -> PgQuery<'q> {
    plan.iter()
        .filter(|binding| !binding.is_out())
        .fold(sqlx::query(sql), |query, binding| {
            bind_value(query, binding.value.clone(), binding.kind)
        })
}

fn bind_value(query: PgQuery<'_>, value: Value, kind: Option<DataKind>) -> PgQuery<'_> {
    match value {
        Value::Null => bind_null(query, kind),
        Value::Bool(v) => query.bind(v),
        Value::Int(v) => query.bind(v),
        Value::Float(v) => query.bind(v),
        Value::Decimal(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
        Value::Date(v) => query.bind(v),
        Value::DateTime(v) => query.bind(v),
        Value::Uuid(v) => query.bind(v),
        Value::Bytes(v) => query.bind(v)
    }
}

fn bind_null(query: PgQuery<'_>, kind: Option<DataKind>) -> PgQuery<'_> {
    match kind {
        Some(DataKind::Integer) => query.bind(None::<i64>),
        Some(DataKind::Decimal) => query.bind(None::<Decimal>),
        Some(DataKind::Date) => query.bind(None::<NaiveDate>),
        Some(DataKind::DateTime) => query.bind(None::<NaiveDateTime>),
        Some(DataKind::Bytes) => query.bind(None::<Vec<u8>>),
        Some(DataKind::Boolean) => query.bind(None::<bool>),
        Some(DataKind::Uuid) => query.bind(None::<Uuid>),
        Some(DataKind::Text | DataKind::LargeText | DataKind::Enum) | None => {
            query.bind(None::<String>)
        }
    }
}

fn convert_row(row: &PgRow) -> Result<Row> {
    let mut out = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let is_null = row
            .try_get_raw(index)
            .map_err(Error::execution)?
            .is_null();
        let value = if is_null {
            Value::Null
        } else {
            read_column(row, index, column.type_info().name())?
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

fn read_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value> {
    let value = match type_name {
        "BOOL" => Value::Bool(row.try_get(index).map_err(Error::execution)?),
        "INT2" => Value::Int(i64::from(
            row.try_get::<i16, _>(index).map_err(Error::execution)?
        )),
        "INT4" => Value::Int(i64::from(
            row.try_get::<i32, _>(index).map_err(Error::execution)?
        )),
        "INT8" => Value::Int(row.try_get(index).map_err(Error::execution)?),
        "FLOAT4" => Value::Float(f64::from(
            row.try_get::<f32, _>(index).map_err(Error::execution)?
        )),
        "FLOAT8" => Value::Float(row.try_get(index).map_err(Error::execution)?),
        "NUMERIC" => Value::Decimal(row.try_get(index).map_err(Error::execution)?),
        "DATE" => Value::Date(row.try_get(index).map_err(Error::execution)?),
        "TIMESTAMP" => Value::DateTime(row.try_get(index).map_err(Error::execution)?),
        "TIMESTAMPTZ" => Value::DateTime(
            row.try_get::<DateTime<Utc>, _>(index)
                .map_err(Error::execution)?
                .naive_utc()
        ),
        "UUID" => Value::Uuid(row.try_get(index).map_err(Error::execution)?),
        "BYTEA" => Value::Bytes(row.try_get(index).map_err(Error::execution)?),
        _ => Value::Text(row.try_get(index).map_err(Error::execution)?)
    };
    Ok(value)
}
