// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Structured SQL builder.
//!
//! SQL is assembled as an ordered list of fragments, each either literal
//! text or a placeholder slot. A slot index is only handed out together with
//! its binding, so placeholder numbering and the binding plan share one
//! counter and always follow emission order.
//!
//! ```rust,ignore
//! let mut b = SqlBuilder::new(Dialect::Postgres);
//! b.push("UPDATE users SET name = ");
//! b.bind(BindSource::Field("name".into()), "Alice".into());
//! b.push(" WHERE id = ");
//! b.bind(BindSource::Field("id".into()), 7.into());
//! let stmt = b.finish();
//! assert_eq!(stmt.sql(), "UPDATE users SET name = $1 WHERE id = $2");
//! ```

use crate::{
    dialect::{Dialect, KeyStrategy},
    metadata::DataKind,
    value::Value
};

/// Where a bound value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindSource {
    /// An entity field.
    Field(String),
    /// A scalar method parameter.
    Param(String),
    /// One element of an expanded list parameter.
    ListElement {
        /// Parameter name.
        param: String,
        /// Element index within the list.
        index: usize
    },
    /// A value supplied directly by the caller.
    Literal,
    /// OUT parameter receiving a generated key.
    OutParameter(String)
}

/// One placeholder position and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// 1-based placeholder position.
    pub position: usize,
    /// Origin of the value.
    pub source:   BindSource,
    /// Value to bind; NULL for OUT parameters.
    pub value:    Value,
    /// Column kind, when the value came from a known column.
    pub kind:     Option<DataKind>
}

impl Binding {
    /// Check for an OUT parameter.
    #[must_use]
    pub const fn is_out(&self) -> bool {
        matches!(self.source, BindSource::OutParameter(_))
    }
}

/// Ordered bindings of one statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindingPlan(Vec<Binding>);

impl BindingPlan {
    /// Number of placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check for a statement without parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate bindings in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.0.iter()
    }

    /// Input values in position order; OUT parameters are skipped.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.0
            .iter()
            .filter(|b| !b.is_out())
            .map(|b| b.value.clone())
            .collect()
    }

    /// Positions of OUT parameters.
    #[must_use]
    pub fn out_positions(&self) -> Vec<usize> {
        self.0
            .iter()
            .filter(|b| b.is_out())
            .map(|b| b.position)
            .collect()
    }

    /// Names of the entity fields bound, in order.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|b| match &b.source {
                BindSource::Field(name) => Some(name.clone()),
                _ => None
            })
            .collect()
    }
}

impl From<Vec<Binding>> for BindingPlan {
    fn from(bindings: Vec<Binding>) -> Self {
        Self(bindings)
    }
}

impl<'a> IntoIterator for &'a BindingPlan {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Primary key the database will generate for an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    /// Primary key field name.
    pub field:    String,
    /// Primary key column name.
    pub column:   String,
    /// How the key comes back.
    pub strategy: KeyStrategy
}

/// Finished SQL text with its binding plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql:           String,
    bindings:      BindingPlan,
    generated_key: Option<GeneratedKey>
}

impl Statement {
    /// Wrap raw SQL and bindings.
    pub fn new(sql: impl Into<String>, bindings: BindingPlan) -> Self {
        Self {
            sql: sql.into(),
            bindings,
            generated_key: None
        }
    }

    /// Attach the generated key descriptor.
    #[must_use]
    pub fn with_generated_key(mut self, key: GeneratedKey) -> Self {
        self.generated_key = Some(key);
        self
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Binding plan.
    #[must_use]
    pub fn bindings(&self) -> &BindingPlan {
        &self.bindings
    }

    /// Generated key, for inserts that let the database pick the id.
    #[must_use]
    pub fn generated_key(&self) -> Option<&GeneratedKey> {
        self.generated_key.as_ref()
    }

    /// Split into text and bindings.
    #[must_use]
    pub fn into_parts(self) -> (String, BindingPlan) {
        (self.sql, self.bindings)
    }
}

#[derive(Debug, Clone)]
enum Fragment {
    Sql(String),
    Slot(usize)
}

/// Incremental statement builder.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    dialect:   Dialect,
    fragments: Vec<Fragment>,
    bindings:  Vec<Binding>
}

impl SqlBuilder {
    /// Start an empty statement.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            fragments: Vec::new(),
            bindings: Vec::new()
        }
    }

    /// Active dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Append literal SQL text.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        let sql = sql.as_ref();
        if sql.is_empty() {
            return self;
        }
        match self.fragments.last_mut() {
            Some(Fragment::Sql(last)) => last.push_str(sql),
            _ => self.fragments.push(Fragment::Sql(sql.to_owned()))
        }
        self
    }

    /// Append a placeholder bound to `value`.
    pub fn bind(&mut self, source: BindSource, value: Value) -> &mut Self {
        self.bind_typed(source, value, None)
    }

    /// Append a placeholder bound to a value of a known column kind.
    pub fn bind_typed(
        &mut self,
        source: BindSource,
        value: Value,
        kind: Option<DataKind>
    ) -> &mut Self {
        let position = self.bindings.len() + 1;
        self.fragments.push(Fragment::Slot(position));
        self.bindings.push(Binding {
            position,
            source,
            value,
            kind
        });
        self
    }

    /// Append one placeholder per element, comma separated.
    ///
    /// An empty list renders as `NULL` so `IN (...)` stays valid and
    /// matches nothing.
    pub fn bind_list(&mut self, param: &str, values: &[Value]) -> &mut Self {
        if values.is_empty() {
            return self.push("NULL");
        }
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.bind(
                BindSource::ListElement {
                    param: param.to_owned(),
                    index
                },
                value.clone()
            );
        }
        self
    }

    /// Append an OUT placeholder for a generated key column.
    pub fn bind_out(&mut self, column: &str) -> &mut Self {
        self.bind(BindSource::OutParameter(column.to_owned()), Value::Null)
    }

    /// Number of placeholders emitted so far.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Check whether nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Render the SQL text and hand over the bindings.
    #[must_use]
    pub fn finish(self) -> Statement {
        let mut sql = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Sql(text) => sql.push_str(text),
                Fragment::Slot(index) => sql.push_str(&self.dialect.placeholder(*index))
            }
        }
        Statement::new(sql, BindingPlan(self.bindings))
    }
}
