// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Query plans for repository methods.
//!
//! [`PlanBuilder::build`] turns a [`MethodDescriptor`] plus call arguments
//! into executable statements:
//!
//! 1. the template comes from the native query or the [`NamingResolver`]
//! 2. every `:token` becomes a dialect placeholder; list arguments expand to
//!    one placeholder per element
//! 3. a page request is appended as `ORDER BY … LIMIT/OFFSET`
//! 4. `Page` methods also get a count statement without the page clause
//!
//! | Return shape | Decoder |
//! |--------------|---------|
//! | `Single`, `List`, `Page` | [`Decoder::Entity`] unless a result handler is passed |
//! | `Count` | [`Decoder::Count`] |
//! | `RowsAffected`, `Void` | [`Decoder::None`] |

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    builder::{BindSource, SqlBuilder, Statement},
    decode::RowHandler,
    dialect::Dialect,
    error::{CodeGenError, Error, Result},
    metadata::EntityDescriptor,
    method::{Argument, MethodDescriptor, ParamDescriptor, ReturnShape},
    page::Pageable,
    resolver::{ConventionResolver, NamingResolver},
    template::{Piece, Template, has_top_level_order_by}
};

/// How result rows are consumed.
#[derive(Clone)]
pub enum Decoder {
    /// Map rows onto the entity.
    Entity,
    /// Feed rows to a caller callback.
    Handler(Arc<dyn RowHandler>),
    /// Read a count from the first column.
    Count,
    /// Rows are not read.
    None
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => f.write_str("Entity"),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Count => f.write_str("Count"),
            Self::None => f.write_str("None")
        }
    }
}

/// Everything needed to execute one method call.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Main statement.
    pub statement: Statement,
    /// Count statement for `Page` methods.
    pub count:     Option<Statement>,
    /// Declared return shape.
    pub shape:     ReturnShape,
    /// Row consumer.
    pub decoder:   Decoder,
    /// Statement modifies data.
    pub modifying: bool,
    /// Page request, when one was passed.
    pub pageable:  Option<Pageable>
}

/// Builds [`QueryPlan`]s for one entity and dialect.
#[derive(Clone, Copy)]
pub struct PlanBuilder<'a> {
    descriptor: &'a EntityDescriptor,
    dialect:    Dialect,
    resolver:   &'a dyn NamingResolver
}

impl<'a> PlanBuilder<'a> {
    /// Builder using [`ConventionResolver`] for derived methods.
    #[must_use]
    pub fn new(descriptor: &'a EntityDescriptor, dialect: Dialect) -> Self {
        Self {
            descriptor,
            dialect,
            resolver: &ConventionResolver
        }
    }

    /// Replace the derived-method resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: &'a dyn NamingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Plan one call.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArguments`] when arguments do not match parameters
    /// - [`Error::Config`] for templates that do not resolve or compile
    /// - [`Error::InvalidPage`] and [`Error::UnknownField`] from the page
    ///   request
    pub fn build(&self, method: &MethodDescriptor, args: &[Argument]) -> Result<QueryPlan> {
        check_arguments(method, args)?;

        let derived = method.native_query.is_none();
        let template = match &method.native_query {
            Some(native) => native.clone(),
            None => self.resolver.resolve(self.descriptor, method)?
        };

        let pageable = method.pageable_index().and_then(|i| match &args[i] {
            Argument::Pageable(p) => Some(p.clone()),
            _ => None
        });
        let handler = method.handler_index().and_then(|i| match &args[i] {
            Argument::Handler(h) => Some(Arc::clone(h)),
            _ => None
        });

        let mut builder = self.compile(method, &template, args)?;
        if let Some(pageable) = &pageable {
            let alias = derived.then(|| self.descriptor.alias());
            let ordered = has_top_level_order_by(&template);
            let clause =
                pageable.render(self.dialect, self.descriptor, alias.as_deref(), ordered)?;
            if !ordered && !template.ends_with(char::is_whitespace) {
                builder.push(" ");
            }
            builder.push(clause);
        }
        let statement = builder.finish();

        let count = if method.return_shape == ReturnShape::Page {
            Some(self.count_statement(method, args)?)
        } else {
            None
        };

        let decoder = match (handler, method.return_shape) {
            (Some(handler), _) => Decoder::Handler(handler),
            (None, ReturnShape::Single | ReturnShape::List | ReturnShape::Page) => Decoder::Entity,
            (None, ReturnShape::Count) => Decoder::Count,
            (None, ReturnShape::RowsAffected | ReturnShape::Void) => Decoder::None
        };

        debug!(
            entity = %self.descriptor.name,
            method = %method.name,
            dialect = %self.dialect,
            params = statement.bindings().len(),
            "built query plan"
        );
        Ok(QueryPlan {
            statement,
            count,
            shape: method.return_shape,
            decoder,
            modifying: method.modifying,
            pageable
        })
    }

    fn count_statement(&self, method: &MethodDescriptor, args: &[Argument]) -> Result<Statement> {
        let template = match (&method.count_query, &method.native_query) {
            (Some(count), _) => count.clone(),
            (None, None) => {
                let Some(rest) = method.name.strip_prefix("find") else {
                    return Err(CodeGenError::UnresolvableMethod {
                        method: method.name.clone(),
                        reason: "page methods derive their count from a `find` name".into()
                    }
                    .into());
                };
                let counting = MethodDescriptor {
                    name: format!("count{rest}"),
                    return_shape: ReturnShape::Count,
                    ..method.clone()
                };
                self.resolver.resolve(self.descriptor, &counting)?
            }
            (None, Some(_)) => {
                return Err(CodeGenError::InvalidMethod {
                    method: method.name.clone(),
                    reason: "native page results need a count query".into()
                }
                .into());
            }
        };
        Ok(self.compile(method, &template, args)?.finish())
    }

    /// Substitute every token; unknown tokens are configuration errors.
    fn compile(
        &self,
        method: &MethodDescriptor,
        template: &str,
        args: &[Argument]
    ) -> Result<SqlBuilder> {
        let mut b = SqlBuilder::new(self.dialect);
        for piece in Template::parse(template).pieces() {
            match piece {
                Piece::Sql(text) => {
                    b.push(text);
                }
                Piece::Param(name) => {
                    let index = method
                        .params
                        .iter()
                        .position(|p| p.is_bindable() && p.name == *name)
                        .ok_or_else(|| CodeGenError::UndeclaredParameter {
                            method: method.name.clone(),
                            token:  name.clone()
                        })?;
                    match &args[index] {
                        Argument::Value(value) => {
                            b.bind(BindSource::Param(name.clone()), value.clone());
                        }
                        Argument::List(values) => {
                            b.bind_list(name, values);
                        }
                        other => {
                            return Err(mismatch(method, &method.params[index], other));
                        }
                    }
                }
            }
        }
        Ok(b)
    }
}

fn check_arguments(method: &MethodDescriptor, args: &[Argument]) -> Result<()> {
    if args.len() != method.params.len() {
        return Err(Error::InvalidArguments {
            method: method.name.clone(),
            reason: format!(
                "expected {} argument(s), got {}",
                method.params.len(),
                args.len()
            )
        });
    }
    for (param, arg) in method.params.iter().zip(args) {
        let fits = match arg {
            Argument::Value(_) => param.is_bindable() && !param.is_list,
            Argument::List(_) => param.is_bindable() && param.is_list,
            Argument::Pageable(_) => param.is_pageable,
            Argument::Handler(_) => param.is_result_handler
        };
        if !fits {
            return Err(mismatch(method, param, arg));
        }
    }
    Ok(())
}

fn mismatch(method: &MethodDescriptor, param: &ParamDescriptor, arg: &Argument) -> Error {
    Error::InvalidArguments {
        method: method.name.clone(),
        reason: format!("parameter `{}` cannot take a {}", param.name, arg.kind())
    }
}
