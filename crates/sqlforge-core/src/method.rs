// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Repository method descriptors and call arguments.
//!
//! A [`MethodDescriptor`] is the runtime stand-in for an abstract repository
//! method. It is either **derived** (`find…`/`count…`, query shape encoded in
//! the name) or **native** (explicit template with `:name` tokens).
//!
//! ```rust,ignore
//! let by_ids = MethodDescriptor::new("findByIds", ReturnShape::List)
//!     .param(ParamDescriptor::list("ids"))
//!     .native("SELECT * FROM users WHERE id IN (:ids)");
//! by_ids.validate()?;
//!
//! let touch = MethodDescriptor::new("touch", ReturnShape::RowsAffected)
//!     .param(ParamDescriptor::value("id"))
//!     .native("UPDATE users SET seen_at = now() WHERE id = :id")
//!     .modifying();
//! ```

use std::{collections::HashSet, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    decode::RowHandler, error::CodeGenError, page::Pageable, template::Template,
    value::Value
};

/// What a method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// Zero or one entity; more than one row is an error.
    Single,
    /// Every matching entity.
    List,
    /// One page plus the total count.
    Page,
    /// A row count from `COUNT(...)`.
    Count,
    /// Rows affected by a modifying statement.
    RowsAffected,
    /// Nothing.
    Void
}

/// One declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Parameter name, matched case-sensitively against `:tokens`.
    pub name:              String,
    /// Bound as a list and expanded into one placeholder per element.
    pub is_list:           bool,
    /// Page request; appended as SQL, never bound.
    pub is_pageable:       bool,
    /// Row callback; replaces the entity decoder, never bound.
    pub is_result_handler: bool
}

impl ParamDescriptor {
    /// Scalar parameter.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name:              name.into(),
            is_list:           false,
            is_pageable:       false,
            is_result_handler: false
        }
    }

    /// List parameter.
    pub fn list(name: impl Into<String>) -> Self {
        Self {
            is_list: true,
            ..Self::value(name)
        }
    }

    /// Page request parameter.
    pub fn pageable(name: impl Into<String>) -> Self {
        Self {
            is_pageable: true,
            ..Self::value(name)
        }
    }

    /// Row callback parameter.
    pub fn result_handler(name: impl Into<String>) -> Self {
        Self {
            is_result_handler: true,
            ..Self::value(name)
        }
    }

    /// Check whether the parameter produces placeholders.
    #[must_use]
    pub const fn is_bindable(&self) -> bool {
        !self.is_pageable && !self.is_result_handler
    }
}

/// Runtime description of a repository method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name; drives derived query resolution.
    pub name:         String,
    /// Parameters in declaration order.
    pub params:       Vec<ParamDescriptor>,
    /// Return shape.
    pub return_shape: ReturnShape,
    /// Native query template.
    pub native_query: Option<String>,
    /// Native count template for [`ReturnShape::Page`].
    pub count_query:  Option<String>,
    /// Statement changes data; zero affected rows is an error.
    pub modifying:    bool
}

impl MethodDescriptor {
    /// Method without parameters or template.
    pub fn new(name: impl Into<String>, return_shape: ReturnShape) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_shape,
            native_query: None,
            count_query: None,
            modifying: false
        }
    }

    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a native template.
    #[must_use]
    pub fn native(mut self, template: impl Into<String>) -> Self {
        self.native_query = Some(template.into());
        self
    }

    /// Attach a native count template.
    #[must_use]
    pub fn count_query(mut self, template: impl Into<String>) -> Self {
        self.count_query = Some(template.into());
        self
    }

    /// Mark as modifying.
    #[must_use]
    pub fn modifying(mut self) -> Self {
        self.modifying = true;
        self
    }

    /// Check whether the query is derived from the method name.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.native_query.is_none()
            && !self.modifying
            && (self.name.starts_with("find") || self.name.starts_with("count"))
            && self.name != "find"
    }

    /// Parameters that produce placeholders.
    pub fn bindable_params(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params.iter().filter(|p| p.is_bindable())
    }

    /// Index of the page request parameter, if any.
    #[must_use]
    pub fn pageable_index(&self) -> Option<usize> {
        self.params.iter().position(|p| p.is_pageable)
    }

    /// Index of the row callback parameter, if any.
    #[must_use]
    pub fn handler_index(&self) -> Option<usize> {
        self.params.iter().position(|p| p.is_result_handler)
    }

    /// Check the descriptor at registration time.
    ///
    /// # Errors
    ///
    /// - [`CodeGenError::UndeclaredParameter`] for a template token with no
    ///   bindable parameter
    /// - [`CodeGenError::UnboundParameter`] for a bindable parameter no
    ///   template token uses
    /// - [`CodeGenError::InvalidMethod`] for misplaced pageable or handler
    ///   parameters, duplicate names, modifying methods without a native
    ///   template and page methods without the pieces a page needs
    pub fn validate(&self) -> Result<(), CodeGenError> {
        let mut names = HashSet::new();
        for p in &self.params {
            if !names.insert(p.name.as_str()) {
                return Err(self.invalid(format!("parameter `{}` declared twice", p.name)));
            }
            if p.is_pageable && p.is_result_handler {
                return Err(self.invalid(format!(
                    "parameter `{}` cannot be both pageable and a result handler",
                    p.name
                )));
            }
        }

        let count = self.params.len();
        if self.params.iter().filter(|p| p.is_pageable).count() > 1 {
            return Err(self.invalid("more than one pageable parameter"));
        }
        if self.params.iter().filter(|p| p.is_result_handler).count() > 1 {
            return Err(self.invalid("more than one result handler"));
        }
        if let Some(i) = self.pageable_index()
            && i + 2 < count
        {
            return Err(self.invalid("pageable must be the last or second-to-last parameter"));
        }
        if let Some(i) = self.handler_index()
            && i + 1 != count
        {
            return Err(self.invalid("result handler must be the last parameter"));
        }

        if self.modifying {
            if self.native_query.is_none() {
                return Err(self.invalid("modifying methods need a native query"));
            }
            if !matches!(
                self.return_shape,
                ReturnShape::RowsAffected | ReturnShape::Void
            ) {
                return Err(self.invalid("modifying methods return rows affected or nothing"));
            }
        }

        if self.return_shape == ReturnShape::Page {
            if self.pageable_index().is_none() {
                return Err(self.invalid("page results need a pageable parameter"));
            }
            if self.native_query.is_some() && self.count_query.is_none() {
                return Err(self.invalid("native page results need a count query"));
            }
        }

        match &self.native_query {
            Some(native) => {
                self.check_tokens(native, true)?;
                if let Some(count) = &self.count_query {
                    self.check_tokens(count, false)?;
                }
                Ok(())
            }
            None if self.is_derived() => Ok(()),
            None => Err(self.invalid("neither a derived name nor a native query"))
        }
    }

    fn check_tokens(&self, template: &str, require_all: bool) -> Result<(), CodeGenError> {
        let template = Template::parse(template);
        let declared: HashSet<&str> = self.bindable_params().map(|p| p.name.as_str()).collect();
        let mut used = HashSet::new();
        for token in template.params() {
            if !declared.contains(token) {
                return Err(CodeGenError::UndeclaredParameter {
                    method: self.name.clone(),
                    token:  token.to_owned()
                });
            }
            used.insert(token);
        }
        if require_all
            && let Some(unused) = self.bindable_params().find(|p| !used.contains(p.name.as_str()))
        {
            return Err(CodeGenError::UnboundParameter {
                method: self.name.clone(),
                param:  unused.name.clone()
            });
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> CodeGenError {
        CodeGenError::InvalidMethod {
            method: self.name.clone(),
            reason: reason.into()
        }
    }
}

/// Actual value supplied for one parameter.
#[derive(Clone)]
pub enum Argument {
    /// Scalar value.
    Value(Value),
    /// List value.
    List(Vec<Value>),
    /// Page request.
    Pageable(Pageable),
    /// Row callback.
    Handler(Arc<dyn RowHandler>)
}

impl Argument {
    /// Scalar argument.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// List argument.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Row callback argument.
    pub fn handler(handler: impl RowHandler + 'static) -> Self {
        Self::Handler(Arc::new(handler))
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::List(_) => "list",
            Self::Pageable(_) => "pageable",
            Self::Handler(_) => "result handler"
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Pageable(p) => f.debug_tuple("Pageable").field(p).finish(),
            Self::Handler(_) => f.write_str("Handler(..)")
        }
    }
}

impl From<Pageable> for Argument {
    fn from(value: Pageable) -> Self {
        Self::Pageable(value)
    }
}
