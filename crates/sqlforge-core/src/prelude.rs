// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlforge_core::prelude::*;
//! ```

#[cfg(feature = "postgres")]
pub use crate::PgExecutor;
pub use crate::{
    Argument, BatchMode, BatchOp, BatchOutcome, CodeGenError, ColumnDescriptor, Condition,
    DataKind, Dialect, Entity, EntityDescriptor, EntityRegistry, Error, Executor, FieldSource,
    MethodDescriptor, Outcome, Page, Pageable, ParamDescriptor, Record, RegistryBuilder,
    ReturnShape, Row, Session, Sort, SortDirection, Specification, Statement, Synthesizer, Value,
    async_trait, synthesize_delete, synthesize_insert, synthesize_update
};
