// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Batch statements sharing one SQL text.
//!
//! Null skipping makes per-row column lists differ, which a driver executing
//! one statement for many rows cannot accept. Two modes cover this:
//!
//! | Mode | Per-row NULL | Shape mismatch |
//! |------|--------------|----------------|
//! | [`BatchMode::Uniform`] | bound as NULL | only a key supplied by some rows and not others |
//! | [`BatchMode::SkipNulls`] | skipped | [`Error::InconsistentBatchShape`] |
//!
//! Outcomes are reported per row, in input order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    builder::BindingPlan,
    dialect::Dialect,
    entity::FieldSource,
    error::{Error, Result},
    metadata::EntityDescriptor,
    synthesizer::{NullPolicy, Synthesizer},
    value::Value
};

/// How NULL fields are treated across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Every row binds every column, NULL included.
    #[default]
    Uniform,
    /// Rows skip NULL columns and must still agree on shape.
    SkipNulls
}

impl BatchMode {
    const fn null_policy(self) -> NullPolicy {
        match self {
            Self::Uniform => NullPolicy::Explicit,
            Self::SkipNulls => NullPolicy::Skip
        }
    }
}

/// Statement kind of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    /// INSERT
    Insert,
    /// UPDATE by primary key
    Update,
    /// DELETE by primary key
    Delete
}

/// One SQL text with one binding plan per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Shared SQL text.
    pub sql:  String,
    /// Binding plans in input order.
    pub rows: Vec<BindingPlan>,
    /// Primary key of each row; NULL when the database generates it.
    pub keys: Vec<Value>
}

/// Result for one batch row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// Input position.
    pub index:         usize,
    /// Primary key of the row.
    pub key:           Value,
    /// Rows changed by this row's execution.
    pub rows_affected: u64
}

/// Per-row results of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Outcomes in input order.
    pub rows: Vec<RowOutcome>
}

impl BatchOutcome {
    /// Pair driver counts with batch rows.
    ///
    /// # Errors
    ///
    /// [`Error::BatchFailed`] when the driver reported a different number of
    /// results than rows were sent.
    pub fn from_counts(batch: &Batch, counts: &[u64]) -> Result<Self> {
        if counts.len() != batch.rows.len() {
            return Err(Error::BatchFailed(format!(
                "{} row(s) sent, {} result(s) reported",
                batch.rows.len(),
                counts.len()
            )));
        }
        Ok(Self {
            rows: batch
                .keys
                .iter()
                .zip(counts)
                .enumerate()
                .map(|(index, (key, &rows_affected))| RowOutcome {
                    index,
                    key: key.clone(),
                    rows_affected
                })
                .collect()
        })
    }

    /// Sum of affected rows.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.rows_affected).sum()
    }

    /// Rows that changed nothing.
    pub fn unaffected(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|r| r.rows_affected == 0)
    }
}

/// Prepares batches for one entity and dialect.
#[derive(Debug, Clone, Copy)]
pub struct BatchCoordinator<'a> {
    descriptor: &'a EntityDescriptor,
    dialect:    Dialect,
    mode:       BatchMode
}

impl<'a> BatchCoordinator<'a> {
    /// Coordinator in [`BatchMode::Uniform`].
    #[must_use]
    pub const fn new(descriptor: &'a EntityDescriptor, dialect: Dialect) -> Self {
        Self {
            descriptor,
            dialect,
            mode: BatchMode::Uniform
        }
    }

    /// Change the mode.
    #[must_use]
    pub const fn mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Synthesize every row and check that they share one SQL text.
    ///
    /// # Errors
    ///
    /// - [`Error::BatchFailed`] for an empty input
    /// - [`Error::InconsistentBatchShape`] when a row differs from row 0
    /// - any per-row synthesis error
    pub fn prepare<S: FieldSource>(&self, op: BatchOp, rows: &[S]) -> Result<Batch> {
        if rows.is_empty() {
            return Err(Error::BatchFailed("no rows to execute".into()));
        }
        let pk = self.descriptor.primary_key()?;
        let synth =
            Synthesizer::new(self.descriptor, self.dialect).null_policy(self.mode.null_policy());

        let mut sql = String::new();
        let mut expected = Vec::new();
        let mut plans = Vec::with_capacity(rows.len());
        let mut keys = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let statement = match op {
                BatchOp::Insert => synth.insert(row)?,
                BatchOp::Update => synth.update(row)?,
                BatchOp::Delete => synth.delete(row)?
            };
            let (row_sql, plan) = statement.into_parts();
            if index == 0 {
                sql = row_sql;
                expected = plan.fields();
            } else if row_sql != sql {
                return Err(Error::InconsistentBatchShape {
                    row: index,
                    expected,
                    found: plan.fields()
                });
            }
            keys.push(row.field_value(&pk.field_name));
            plans.push(plan);
        }

        debug!(
            entity = %self.descriptor.name,
            ?op,
            rows = plans.len(),
            mode = ?self.mode,
            "prepared batch"
        );
        Ok(Batch {
            sql,
            rows: plans,
            keys
        })
    }
}
