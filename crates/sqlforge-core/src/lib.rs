// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime engine for sqlforge.
//!
//! Turns entity metadata and repository method descriptions into
//! dialect-specific SQL with ordered parameter bindings, and maps result rows
//! back into entities.
//!
//! # Overview
//!
//! | Layer | Items |
//! |-------|-------|
//! | Metadata | [`EntityDescriptor`], [`ColumnDescriptor`], [`EntityRegistry`] |
//! | Dialects | [`Dialect`], [`KeyStrategy`] |
//! | Synthesis | [`Synthesizer`], [`SqlBuilder`], [`Statement`] |
//! | Methods | [`MethodDescriptor`], [`ConventionResolver`], [`PlanBuilder`] |
//! | Queries | [`Pageable`], [`Page`], [`Specification`] |
//! | Batches | [`BatchCoordinator`], [`BatchOutcome`] |
//! | Results | [`Row`], [`decode_row`], [`extract_generated_key`] |
//! | Execution | [`Executor`], [`Session`], `PgExecutor` (feature `postgres`) |
//!
//! Most users derive [`Entity`] through the `sqlforge` crate, which
//! re-exports this one.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlforge_core::prelude::*;
//!
//! let statement = synthesize_insert(&user, Dialect::MySql)?;
//! assert_eq!(statement.sql(), "INSERT INTO users (name) VALUES (?)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod batch;
pub mod builder;
pub mod config;
pub mod decode;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod executor;
pub mod metadata;
pub mod method;
pub mod page;
pub mod plan;
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod specification;
pub mod synthesizer;
pub mod template;
pub mod value;

/// Re-export async_trait for executor implementations.
pub use async_trait::async_trait;
pub use batch::{Batch, BatchCoordinator, BatchMode, BatchOp, BatchOutcome, RowOutcome};
pub use builder::{BindSource, Binding, BindingPlan, GeneratedKey, SqlBuilder, Statement};
pub use config::{ConfigError, EngineConfig};
pub use decode::{
    ExecutionResult, Row, RowHandler, decode_count, decode_row, decode_rows,
    extract_generated_key
};
pub use dialect::{Dialect, KeyStrategy};
pub use entity::{Entity, FieldSource, Record};
pub use error::{CodeGenError, DecodeError, Error, Result};
pub use executor::Executor;
pub use metadata::{ColumnDescriptor, DataKind, EntityDescriptor};
pub use method::{Argument, MethodDescriptor, ParamDescriptor, ReturnShape};
pub use page::{Page, Pageable, Sort, SortDirection};
pub use plan::{Decoder, PlanBuilder, QueryPlan};
#[cfg(feature = "postgres")]
pub use postgres::PgExecutor;
pub use registry::{EntityRegistry, RegistryBuilder};
pub use resolver::{ConventionResolver, NamingResolver};
pub use session::{Outcome, Session};
pub use specification::{ComposedQuery, Condition, Specification, compose};
pub use synthesizer::{
    NullPolicy, Synthesizer, synthesize_delete, synthesize_insert, synthesize_update
};
pub use template::Template;
pub use value::{FromValue, ToValue, Value};

/// Items used by `#[derive(Entity)]` expansions.
#[doc(hidden)]
pub mod __private {
    pub use crate::value::{
        enum_from_value, enum_to_value, option_enum_from_value, option_enum_to_value
    };
}
