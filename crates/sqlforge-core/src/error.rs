// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error taxonomy.
//!
//! Failures fall into three groups that callers handle differently:
//!
//! | Type | Raised | Meaning |
//! |------|--------|---------|
//! | [`CodeGenError`] | Registration | Entity or method metadata is unusable; fatal to startup |
//! | [`Error`] | Per call | One repository operation failed; recoverable |
//! | [`DecodeError`] | Per column | A value could not be converted into a field |
//!
//! A [`DecodeError`] only reaches the caller (wrapped in [`Error::Decode`])
//! for strict columns. Columns flagged `lenient` log it and keep their zero
//! value instead.

use thiserror::Error;

use crate::dialect::Dialect;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Configuration fault detected while registering entities or methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeGenError {
    /// The entity declares no primary key column.
    #[error("entity `{entity}` declares no primary key")]
    MissingPrimaryKeyColumn {
        /// Entity name.
        entity: String
    },

    /// The entity declares more than one primary key column.
    #[error("entity `{entity}` declares more than one primary key: {columns:?}")]
    DuplicatePrimaryKey {
        /// Entity name.
        entity:  String,
        /// Every column flagged as primary key.
        columns: Vec<String>
    },

    /// The entity has a blank table name.
    #[error("entity `{entity}` has no table name")]
    MissingTableName {
        /// Entity name.
        entity: String
    },

    /// Two columns share a field name or a database name.
    #[error("entity `{entity}` declares `{column}` twice")]
    DuplicateColumn {
        /// Entity name.
        entity: String,
        /// Offending field or column name.
        column: String
    },

    /// An entity with this name is already registered.
    #[error("entity `{0}` is already registered")]
    DuplicateEntity(String),

    /// No entity with this name is registered.
    #[error("entity `{0}` is not registered")]
    UnknownEntity(String),

    /// A method with this name is already registered for the entity.
    #[error("method `{method}` is already registered for `{entity}`")]
    DuplicateMethod {
        /// Entity name.
        entity: String,
        /// Method name.
        method: String
    },

    /// No method with this name is registered for the entity.
    #[error("method `{method}` is not registered for `{entity}`")]
    UnknownMethod {
        /// Entity name.
        entity: String,
        /// Method name.
        method: String
    },

    /// A `:token` in a query template names no declared parameter.
    #[error("method `{method}` references undeclared parameter `:{token}`")]
    UndeclaredParameter {
        /// Method name.
        method: String,
        /// Token without the leading colon.
        token:  String
    },

    /// A declared bindable parameter never appears in the query.
    #[error("method `{method}` declares parameter `{param}` that the query never binds")]
    UnboundParameter {
        /// Method name.
        method: String,
        /// Parameter name.
        param:  String
    },

    /// The method descriptor is structurally invalid.
    #[error("method `{method}`: {reason}")]
    InvalidMethod {
        /// Method name.
        method: String,
        /// Human readable reason.
        reason: String
    },

    /// A derived method name could not be turned into a query.
    #[error("cannot derive a query from `{method}`: {reason}")]
    UnresolvableMethod {
        /// Method name.
        method: String,
        /// Human readable reason.
        reason: String
    },

    /// The dialect tag is not one of the supported databases.
    #[error("unsupported database type `{0}`")]
    UnsupportedDialect(String),

    /// The process-wide registry was installed twice.
    #[error("the entity registry is already installed")]
    RegistryInstalled
}

/// Failure converting a [`Value`](crate::Value) into a field type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// NULL arrived for a field that cannot hold it.
    #[error("unexpected NULL")]
    UnexpectedNull,

    /// The value variant cannot be converted into the target type.
    #[error("cannot convert {found} into {expected}")]
    TypeMismatch {
        /// Target type.
        expected: &'static str,
        /// Variant that arrived.
        found:    &'static str
    },

    /// A textual value failed to parse.
    #[error("cannot parse `{input}` as {expected}")]
    Parse {
        /// Target type.
        expected: &'static str,
        /// Offending input.
        input:    String
    },

    /// The value is not a member of the target enum.
    #[error("unknown enum member `{0}`")]
    UnknownVariant(String),

    /// The entity has no field with this name.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// A large object could not be read as UTF-8 text.
    #[error("large object is not valid UTF-8")]
    InvalidUtf8
}

/// Per-call failure of a repository operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata fault surfaced at call time.
    #[error(transparent)]
    Config(#[from] CodeGenError),

    /// Update or delete on an entity whose primary key is null.
    #[error("primary key `{column}` of `{entity}` is null")]
    MissingPrimaryKey {
        /// Entity name.
        entity: String,
        /// Primary key field.
        column: String
    },

    /// A non-nullable column has no value.
    #[error("column `{column}` of `{entity}` is required but null")]
    MissingRequiredColumn {
        /// Entity name.
        entity: String,
        /// Field name.
        column: String
    },

    /// Update with nothing left to SET after null skipping.
    #[error("update of `{entity}` has no column with a value")]
    EmptyUpdate {
        /// Entity name.
        entity: String
    },

    /// A single-row method matched more than one row.
    #[error("expected at most one row, got {rows}")]
    NonUniqueResult {
        /// Rows returned.
        rows: usize
    },

    /// A modifying statement changed nothing.
    #[error("no row was affected")]
    NoRowsAffected,

    /// The generated key was not found where the dialect puts it.
    #[error("cannot extract generated key `{column}` for {dialect}: {reason}")]
    KeyExtractionFailed {
        /// Primary key column.
        column:  String,
        /// Active dialect.
        dialect: Dialect,
        /// What was missing.
        reason:  String
    },

    /// A batch row does not line up with the first row's columns.
    #[error("batch row {row} binds {found:?} but row 0 binds {expected:?}")]
    InconsistentBatchShape {
        /// Index of the offending row.
        row:      usize,
        /// Columns bound by row 0.
        expected: Vec<String>,
        /// Columns bound by the offending row.
        found:    Vec<String>
    },

    /// The driver reported no usable batch outcome.
    #[error("batch failed: {0}")]
    BatchFailed(String),

    /// A field name that maps to no column.
    #[error("cannot find the column name of [{field}] in `{entity}`")]
    UnknownField {
        /// Entity name.
        entity: String,
        /// Field name.
        field:  String
    },

    /// Call arguments do not match the method descriptor.
    #[error("invalid arguments for `{method}`: {reason}")]
    InvalidArguments {
        /// Method name.
        method: String,
        /// Human readable reason.
        reason: String
    },

    /// Page number or size out of range.
    #[error("invalid page request: {0}")]
    InvalidPage(String),

    /// A strict column failed to decode.
    #[error("failed to decode column `{column}`")]
    Decode {
        /// Column name.
        column: String,
        /// Underlying conversion failure.
        #[source]
        source: DecodeError
    },

    /// The execution collaborator failed.
    #[error("operation failed")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>)
}

impl Error {
    /// Wrap a driver error.
    pub fn execution(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Execution(err.into())
    }

    /// Check whether this is a registration-time fault.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
