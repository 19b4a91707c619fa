// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Connection boundary.
//!
//! The engine never talks to a database itself. An [`Executor`] runs the
//! statements it produces; driver failures come back as
//! [`Error::Execution`](crate::Error::Execution).
//!
//! ```rust,ignore
//! #[async_trait]
//! impl Executor for MyConnection {
//!     async fn execute(&self, statement: &Statement) -> Result<u64> {
//!         self.run(statement.sql(), statement.bindings().values())
//!             .await
//!             .map_err(Error::execution)
//!     }
//!
//!     async fn query(&self, statement: &Statement) -> Result<Vec<Row>> {
//!         // ...
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::{
    builder::{BindingPlan, Statement},
    decode::{ExecutionResult, Row},
    dialect::KeyStrategy,
    error::Result
};

/// Executes synthesized statements.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement and report the affected row count.
    ///
    /// # Errors
    ///
    /// Driver failure.
    async fn execute(&self, statement: &Statement) -> Result<u64>;

    /// Run a statement and collect its rows.
    ///
    /// # Errors
    ///
    /// Driver failure.
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>>;

    /// Run an INSERT that hands back a generated key.
    ///
    /// The default reads rows for `RETURNING`/`OUTPUT` strategies and only
    /// counts rows otherwise. Drivers with a last-insert-id side channel or
    /// OUT parameters override it to fill those fields.
    ///
    /// # Errors
    ///
    /// Driver failure.
    async fn execute_returning(&self, statement: &Statement) -> Result<ExecutionResult> {
        match statement.generated_key().map(|key| key.strategy) {
            Some(KeyStrategy::ReturningClause | KeyStrategy::OutputInsertedClause) => {
                let rows = self.query(statement).await?;
                Ok(ExecutionResult {
                    rows_affected: rows.len() as u64,
                    rows,
                    ..ExecutionResult::default()
                })
            }
            _ => Ok(ExecutionResult::affected(self.execute(statement).await?))
        }
    }

    /// Run one SQL text once per binding plan.
    ///
    /// Returns one count per plan, in order. The default executes the rows
    /// one after another and stops at the first failure.
    ///
    /// # Errors
    ///
    /// Driver failure.
    async fn execute_batch(&self, sql: &str, rows: &[BindingPlan]) -> Result<Vec<u64>> {
        let mut counts = Vec::with_capacity(rows.len());
        for plan in rows {
            counts.push(self.execute(&Statement::new(sql, plan.clone())).await?);
        }
        Ok(counts)
    }
}
