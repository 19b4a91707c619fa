// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Synthesis plus execution for one unit of work.
//!
//! A [`Session`] wraps an [`Executor`] and the [`EngineConfig`], and runs
//! every statement the engine can produce:
//!
//! | Call | Statement | Result |
//! |------|-----------|--------|
//! | [`Session::insert`] | INSERT | generated key written back into the entity |
//! | [`Session::update`] / [`Session::delete`] | by primary key | rows affected |
//! | [`Session::run`] | repository method | [`Outcome`] |
//! | [`Session::find_page`] / [`Session::find_all`] / [`Session::count`] | [`Specification`] | entities or count |
//! | [`Session::batch`] | batch INSERT/UPDATE/DELETE | [`BatchOutcome`] |
//!
//! ```rust,ignore
//! let session = Session::new(PgExecutor::new(pool), Dialect::Postgres);
//!
//! let mut user = User { id: None, name: Some("Alice".into()), ..Default::default() };
//! session.insert(&mut user).await?;
//! assert!(user.id.is_some());
//!
//! let by_name = registry.method("User", "findByName")?;
//! let found: Option<User> = session
//!     .run::<User>(by_name, &[Argument::value("Alice")])
//!     .await?
//!     .into_single();
//! ```

use tracing::{debug, warn};

use crate::{
    batch::{BatchCoordinator, BatchOp, BatchOutcome},
    builder::{BindingPlan, Statement},
    config::EngineConfig,
    decode::{decode_count, decode_row, decode_rows, extract_generated_key},
    dialect::{Dialect, KeyStrategy},
    entity::Entity,
    error::{Error, Result},
    executor::Executor,
    method::{Argument, MethodDescriptor, ReturnShape},
    page::{Page, Pageable},
    plan::{Decoder, PlanBuilder},
    specification::{Specification, compose},
    synthesizer::Synthesizer
};

/// Result of [`Session::run`], shaped by the method's return shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<E> {
    /// Zero or one entity; zero rows yield `E::default()`.
    Single(E),
    /// Every matching entity.
    List(Vec<E>),
    /// One page with totals.
    Page(Page<E>),
    /// A count.
    Count(u64),
    /// Rows changed by a modifying query.
    RowsAffected(u64),
    /// Nothing to return.
    Void,
    /// Rows fed to a result handler.
    Handled(usize)
}

impl<E> Outcome<E> {
    /// The single entity, if this is [`Outcome::Single`].
    #[must_use]
    pub fn into_single(self) -> Option<E> {
        match self {
            Self::Single(entity) => Some(entity),
            _ => None
        }
    }

    /// The entities, if this is [`Outcome::List`].
    #[must_use]
    pub fn into_list(self) -> Option<Vec<E>> {
        match self {
            Self::List(entities) => Some(entities),
            _ => None
        }
    }

    /// The page, if this is [`Outcome::Page`].
    #[must_use]
    pub fn into_page(self) -> Option<Page<E>> {
        match self {
            Self::Page(page) => Some(page),
            _ => None
        }
    }

    /// Numeric result of `Count`, `RowsAffected` or `Handled`.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        match self {
            Self::Count(n) | Self::RowsAffected(n) => Some(*n),
            Self::Handled(n) => Some(*n as u64),
            _ => None
        }
    }
}

/// Engine bound to an executor.
#[derive(Debug, Clone)]
pub struct Session<X> {
    executor: X,
    config:   EngineConfig
}

impl<X: Executor> Session<X> {
    /// Session with default settings for `dialect`.
    pub fn new(executor: X, dialect: Dialect) -> Self {
        Self::with_config(executor, EngineConfig::for_dialect(dialect))
    }

    /// Session with explicit settings.
    pub const fn with_config(executor: X, config: EngineConfig) -> Self {
        Self {
            executor,
            config
        }
    }

    /// Active dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying executor.
    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    /// Page request of the configured default size.
    #[must_use]
    pub const fn page_request(&self, page_number: u32) -> Pageable {
        Pageable::new(page_number, self.config.default_page_size)
    }

    /// Insert an entity, writing a generated key back into it.
    ///
    /// Returns the affected-row count exactly as the driver reported it.
    ///
    /// # Errors
    ///
    /// - synthesis errors from [`Synthesizer::insert`]
    /// - [`Error::KeyExtractionFailed`] when the key cannot be read back
    /// - [`Error::Execution`] from the executor
    pub async fn insert<E: Entity>(&self, entity: &mut E) -> Result<u64> {
        let descriptor = E::descriptor();
        let dialect = self.dialect();
        let statement = Synthesizer::new(descriptor, dialect).insert(&*entity)?;
        let Some(key) = statement.generated_key().cloned() else {
            return self.executor.execute(&statement).await;
        };

        let mut result = self.executor.execute_returning(&statement).await?;
        let channel_empty = match key.strategy {
            KeyStrategy::LastInsertIdQuery => result.last_insert_id.is_none(),
            KeyStrategy::OutputInsertedClause => result.rows.is_empty(),
            KeyStrategy::ReturningClause | KeyStrategy::ReturningIntoBinding => false
        };
        if channel_empty && let Some(identity) = dialect.identity_query() {
            warn!(
                entity = %descriptor.name,
                %dialect,
                "driver returned no generated key, falling back to {identity}"
            );
            let rows = self
                .executor
                .query(&Statement::new(identity, BindingPlan::default()))
                .await?;
            match key.strategy {
                KeyStrategy::LastInsertIdQuery => {
                    result.last_insert_id =
                        rows.first().and_then(|row| row.get_index(0)).cloned();
                }
                _ => result.rows = rows
            }
        }

        let value = extract_generated_key(&result, descriptor, dialect)?;
        entity
            .set(&key.field, value)
            .map_err(|source| Error::Decode {
                column: key.column.clone(),
                source
            })?;
        debug!(entity = %descriptor.name, "generated key written back");
        if result.rows_affected == 0 {
            warn!(
                entity = %descriptor.name,
                %dialect,
                "generated key read back but the driver reported 0 affected rows"
            );
        }
        Ok(result.rows_affected)
    }

    /// Update an entity by primary key.
    ///
    /// # Errors
    ///
    /// Synthesis errors from [`Synthesizer::update`] and executor failures.
    pub async fn update<E: Entity>(&self, entity: &E) -> Result<u64> {
        let statement = Synthesizer::new(E::descriptor(), self.dialect()).update(entity)?;
        self.executor.execute(&statement).await
    }

    /// Delete an entity by primary key.
    ///
    /// # Errors
    ///
    /// Synthesis errors from [`Synthesizer::delete`] and executor failures.
    pub async fn delete<E: Entity>(&self, entity: &E) -> Result<u64> {
        let statement = Synthesizer::new(E::descriptor(), self.dialect()).delete(entity)?;
        self.executor.execute(&statement).await
    }

    /// Plan and execute a repository method.
    ///
    /// # Errors
    ///
    /// - planning errors from [`PlanBuilder::build`]
    /// - [`Error::NoRowsAffected`] for a modifying query that changed nothing
    /// - [`Error::NonUniqueResult`] for a `Single` method matching many rows
    /// - decode and executor failures
    pub async fn run<E: Entity>(
        &self,
        method: &MethodDescriptor,
        args: &[Argument]
    ) -> Result<Outcome<E>> {
        let dialect = self.dialect();
        let plan = PlanBuilder::new(E::descriptor(), dialect).build(method, args)?;

        if matches!(plan.decoder, Decoder::None) {
            let affected = self.executor.execute(&plan.statement).await?;
            if plan.modifying && affected == 0 {
                return Err(Error::NoRowsAffected);
            }
            return Ok(match plan.shape {
                ReturnShape::RowsAffected => Outcome::RowsAffected(affected),
                _ => Outcome::Void
            });
        }

        let rows = self.executor.query(&plan.statement).await?;
        match plan.decoder {
            Decoder::Handler(handler) => {
                for row in &rows {
                    handler.handle(row)?;
                }
                Ok(Outcome::Handled(rows.len()))
            }
            Decoder::Count => Ok(Outcome::Count(decode_count(&rows)?)),
            Decoder::Entity | Decoder::None => match plan.shape {
                ReturnShape::Single => {
                    if rows.len() > 1 {
                        return Err(Error::NonUniqueResult {
                            rows: rows.len()
                        });
                    }
                    let entity = match rows.first() {
                        Some(row) => decode_row(row, dialect)?,
                        None => E::default()
                    };
                    Ok(Outcome::Single(entity))
                }
                ReturnShape::Page => {
                    let pageable = plan
                        .pageable
                        .ok_or_else(|| Error::InvalidPage("page method called without a page".into()))?;
                    let total = match &plan.count {
                        Some(count) => decode_count(&self.executor.query(count).await?)?,
                        None => rows.len() as u64
                    };
                    let content = decode_rows(&rows, dialect)?;
                    Ok(Outcome::Page(Page::new(content, total, &pageable)))
                }
                _ => Ok(Outcome::List(decode_rows(&rows, dialect)?))
            }
        }
    }

    /// One page of entities matching a specification.
    ///
    /// # Errors
    ///
    /// Composition, decode and executor failures.
    pub async fn find_page<E: Entity>(
        &self,
        spec: &Specification,
        pageable: &Pageable
    ) -> Result<Page<E>> {
        let dialect = self.dialect();
        let query = compose(E::descriptor(), spec, Some(pageable), dialect)?;
        let rows = self.executor.query(&query.page).await?;
        let total = decode_count(&self.executor.query(&query.count).await?)?;
        Ok(Page::new(decode_rows(&rows, dialect)?, total, pageable))
    }

    /// Every entity matching a specification.
    ///
    /// # Errors
    ///
    /// Composition, decode and executor failures.
    pub async fn find_all<E: Entity>(&self, spec: &Specification) -> Result<Vec<E>> {
        let dialect = self.dialect();
        let query = compose(E::descriptor(), spec, None, dialect)?;
        decode_rows(&self.executor.query(&query.page).await?, dialect)
    }

    /// Number of entities matching a specification.
    ///
    /// # Errors
    ///
    /// Composition, decode and executor failures.
    pub async fn count<E: Entity>(&self, spec: &Specification) -> Result<u64> {
        let query = compose(E::descriptor(), spec, None, self.dialect())?;
        decode_count(&self.executor.query(&query.count).await?)
    }

    /// Run one statement for many entities.
    ///
    /// Uses the configured batch mode. Generated keys are not read back.
    ///
    /// # Errors
    ///
    /// - batch preparation errors from [`BatchCoordinator::prepare`]
    /// - [`Error::BatchFailed`] when the driver reports fewer results than rows
    pub async fn batch<E: Entity>(&self, op: BatchOp, entities: &[E]) -> Result<BatchOutcome> {
        let batch = BatchCoordinator::new(E::descriptor(), self.dialect())
            .mode(self.config.batch_mode)
            .prepare(op, entities)?;
        let counts = self.executor.execute_batch(&batch.sql, &batch.rows).await?;
        BatchOutcome::from_counts(&batch, &counts)
    }
}
