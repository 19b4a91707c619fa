// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dynamic WHERE clauses composed at call time.
//!
//! A [`Specification`] is a tree of conditions and nested groups joined by
//! AND/OR. [`compose`] renders it twice, once behind the entity SELECT with
//! the page clause and once behind `SELECT COUNT(1)`, so both statements bind
//! the same predicate values in the same order.
//!
//! ```rust,ignore
//! let spec = Specification::new()
//!     .and(Condition::eq("status", "active"))
//!     .and_group(
//!         Specification::new()
//!             .or(Condition::like("name", "A%"))
//!             .or(Condition::is_null("name"))
//!     );
//!
//! let q = compose(&users, &spec, Some(&Pageable::new(1, 20)), Dialect::Postgres)?;
//! // SELECT u.id, ... FROM users u WHERE u.status = $1 AND (u.name LIKE $2 OR u.name IS NULL)
//! //     LIMIT 20 OFFSET 0
//! // SELECT COUNT(1) FROM users u WHERE u.status = $1 AND (u.name LIKE $2 OR u.name IS NULL)
//! ```

use tracing::debug;

use crate::{
    builder::{BindSource, SqlBuilder, Statement},
    dialect::Dialect,
    error::Result,
    metadata::EntityDescriptor,
    page::Pageable,
    value::Value
};

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Compare(&'static str, Value),
    List {
        negated: bool,
        values:  Vec<Value>
    },
    Between {
        negated: bool,
        low:     Value,
        high:    Value
    },
    Null {
        negated: bool
    }
}

/// One predicate on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field:     String,
    predicate: Predicate
}

impl Condition {
    fn compare(field: impl Into<String>, op: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field:     field.into(),
            predicate: Predicate::Compare(op, value.into())
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, "=", value)
    }

    /// `field <> value`
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, "<>", value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, "<", value)
    }

    /// `field <= value`
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, "<=", value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ">", value)
    }

    /// `field >= value`
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ">=", value)
    }

    /// `field LIKE pattern`
    pub fn like(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::compare(field, "LIKE", pattern)
    }

    /// `field NOT LIKE pattern`
    pub fn not_like(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::compare(field, "NOT LIKE", pattern)
    }

    /// `field IN (...)`; an empty list matches nothing.
    pub fn in_list<T: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>
    ) -> Self {
        Self {
            field:     field.into(),
            predicate: Predicate::List {
                negated: false,
                values:  values.into_iter().map(Into::into).collect()
            }
        }
    }

    /// `field NOT IN (...)`
    pub fn not_in<T: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>
    ) -> Self {
        Self {
            field:     field.into(),
            predicate: Predicate::List {
                negated: true,
                values:  values.into_iter().map(Into::into).collect()
            }
        }
    }

    /// `field BETWEEN low AND high`
    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>
    ) -> Self {
        Self {
            field:     field.into(),
            predicate: Predicate::Between {
                negated: false,
                low:     low.into(),
                high:    high.into()
            }
        }
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field:     field.into(),
            predicate: Predicate::Null {
                negated: false
            }
        }
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field:     field.into(),
            predicate: Predicate::Null {
                negated: true
            }
        }
    }

    fn render(
        &self,
        b: &mut SqlBuilder,
        descriptor: &EntityDescriptor,
        alias: &str
    ) -> Result<()> {
        let column = descriptor.column_for(&self.field)?;
        let kind = Some(column.kind);
        let source = || BindSource::Param(self.field.clone());
        b.push(format!("{alias}.{} ", column.db_name));
        match &self.predicate {
            Predicate::Compare(op, value) => {
                b.push(format!("{op} "))
                    .bind_typed(source(), value.clone(), kind);
            }
            Predicate::List {
                negated,
                values
            } => {
                b.push(if *negated { "NOT IN (" } else { "IN (" })
                    .bind_list(&self.field, values)
                    .push(")");
            }
            Predicate::Between {
                negated,
                low,
                high
            } => {
                b.push(if *negated { "NOT BETWEEN " } else { "BETWEEN " })
                    .bind_typed(source(), low.clone(), kind)
                    .push(" AND ")
                    .bind_typed(source(), high.clone(), kind);
            }
            Predicate::Null {
                negated
            } => {
                b.push(if *negated { "IS NOT NULL" } else { "IS NULL" });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    And,
    Or
}

impl Connector {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR "
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Condition(Condition),
    Group(Specification)
}

/// Tree of conditions joined by AND/OR.
///
/// The connector of the first entry is ignored. Empty groups render as
/// nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    entries: Vec<(Connector, Node)>
}

impl Specification {
    /// Empty specification; matches every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition joined with AND.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.entries.push((Connector::And, Node::Condition(condition)));
        self
    }

    /// Add a condition joined with OR.
    #[must_use]
    pub fn or(mut self, condition: Condition) -> Self {
        self.entries.push((Connector::Or, Node::Condition(condition)));
        self
    }

    /// Add a parenthesised group joined with AND.
    #[must_use]
    pub fn and_group(mut self, group: Self) -> Self {
        self.entries.push((Connector::And, Node::Group(group)));
        self
    }

    /// Add a parenthesised group joined with OR.
    #[must_use]
    pub fn or_group(mut self, group: Self) -> Self {
        self.entries.push((Connector::Or, Node::Group(group)));
        self
    }

    /// Check whether no condition would be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, node)| match node {
            Node::Condition(_) => false,
            Node::Group(group) => group.is_empty()
        })
    }

    /// Append ` WHERE …` to `b`, or nothing for an empty specification.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnknownField`] for a field with no column.
    pub fn append_where(
        &self,
        b: &mut SqlBuilder,
        descriptor: &EntityDescriptor,
        alias: &str
    ) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        b.push(" WHERE ");
        self.render(b, descriptor, alias)
    }

    fn render(&self, b: &mut SqlBuilder, descriptor: &EntityDescriptor, alias: &str) -> Result<()> {
        let mut first = true;
        for (connector, node) in &self.entries {
            if let Node::Group(group) = node
                && group.is_empty()
            {
                continue;
            }
            if !first {
                b.push(connector.as_sql());
            }
            first = false;
            match node {
                Node::Condition(condition) => condition.render(b, descriptor, alias)?,
                Node::Group(group) => {
                    b.push("(");
                    group.render(b, descriptor, alias)?;
                    b.push(")");
                }
            }
        }
        Ok(())
    }
}

/// Page query and its matching count query.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    /// Entity SELECT with filter and page clause.
    pub page:  Statement,
    /// `SELECT COUNT(1)` with the same filter.
    pub count: Statement
}

/// Render a specification against an entity.
///
/// Page sizes and offsets are inlined as literals, so the page and count
/// statements carry identical binding plans.
///
/// # Errors
///
/// - [`crate::Error::UnknownField`] for a field with no column
/// - [`crate::Error::InvalidPage`] for page 0 or size 0
pub fn compose(
    descriptor: &EntityDescriptor,
    spec: &Specification,
    pageable: Option<&Pageable>,
    dialect: Dialect
) -> Result<ComposedQuery> {
    let alias = descriptor.alias();
    let table = descriptor.qualified_table();

    let mut page = SqlBuilder::new(dialect);
    page.push(format!(
        "SELECT {} FROM {table} {alias}",
        descriptor.select_list()
    ));
    spec.append_where(&mut page, descriptor, &alias)?;
    if let Some(pageable) = pageable {
        page.push(" ");
        page.push(pageable.to_sql(dialect, descriptor, Some(&alias))?);
    }

    let mut count = SqlBuilder::new(dialect);
    count.push(format!("SELECT COUNT(1) FROM {table} {alias}"));
    spec.append_where(&mut count, descriptor, &alias)?;

    let composed = ComposedQuery {
        page:  page.finish(),
        count: count.finish()
    };
    debug!(
        entity = %descriptor.name,
        %dialect,
        params = composed.count.bindings().len(),
        "composed specification"
    );
    Ok(composed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        metadata::{ColumnDescriptor, DataKind},
        page::SortDirection
    };

    fn users() -> EntityDescriptor {
        EntityDescriptor::new("User", "users")
            .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key())
            .with_column(ColumnDescriptor::new("name", DataKind::Text))
            .with_column(ColumnDescriptor::new("status", DataKind::Enum))
    }

    #[test]
    fn empty_spec_has_no_where() {
        let q = compose(&users(), &Specification::new(), None, Dialect::Postgres).unwrap();
        assert_eq!(q.page.sql(), "SELECT u.id, u.name, u.status FROM users u");
        assert_eq!(q.count.sql(), "SELECT COUNT(1) FROM users u");
    }

    #[test]
    fn empty_groups_have_no_where() {
        let spec = Specification::new().and_group(Specification::new());
        assert!(spec.is_empty());
        let q = compose(&users(), &spec, None, Dialect::MySql).unwrap();
        assert!(!q.count.sql().contains("WHERE"));
    }

    #[test]
    fn nested_groups() {
        let spec = Specification::new()
            .and(Condition::eq("status", "active"))
            .and_group(
                Specification::new()
                    .or(Condition::like("name", "A%"))
                    .or(Condition::is_null("name"))
            );
        let q = compose(&users(), &spec, None, Dialect::Postgres).unwrap();
        assert_eq!(
            q.count.sql(),
            "SELECT COUNT(1) FROM users u WHERE u.status = $1 AND (u.name LIKE $2 OR u.name IS NULL)"
        );
    }

    #[test]
    fn page_and_count_bind_identically() {
        let spec = Specification::new()
            .and(Condition::in_list("id", [1, 2, 3]))
            .and(Condition::between("name", "a", "m"))
            .or(Condition::ne("status", "gone"));
        let pageable = Pageable::new(2, 10).sort_by("name", SortDirection::Asc);
        let q = compose(&users(), &spec, Some(&pageable), Dialect::SqlServer).unwrap();
        assert_eq!(q.page.bindings().values(), q.count.bindings().values());
        assert_eq!(q.page.bindings().len(), 6);
        assert_eq!(
            q.page.sql(),
            "SELECT u.id, u.name, u.status FROM users u WHERE u.id IN (@p1, @p2, @p3) \
             AND u.name BETWEEN @p4 AND @p5 OR u.status <> @p6 \
             ORDER BY u.name ASC OFFSET 10 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn negations_and_comparisons() {
        let spec = Specification::new()
            .and(Condition::not_in("id", Vec::<i64>::new()))
            .and(Condition::not_like("name", "%x"))
            .and(Condition::lt("id", 10))
            .and(Condition::le("id", 9))
            .and(Condition::gt("id", 1))
            .and(Condition::ge("id", 2))
            .and(Condition::is_not_null("status"));
        let q = compose(&users(), &spec, None, Dialect::MySql).unwrap();
        assert_eq!(
            q.count.sql(),
            "SELECT COUNT(1) FROM users u WHERE u.id NOT IN (NULL) AND u.name NOT LIKE ? \
             AND u.id < ? AND u.id <= ? AND u.id > ? AND u.id >= ? AND u.status IS NOT NULL"
        );
    }

    #[test]
    fn unknown_field() {
        let spec = Specification::new().and(Condition::eq("nickname", "x"));
        assert!(matches!(
            compose(&users(), &spec, None, Dialect::Postgres),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn leading_or_connector_ignored() {
        let spec = Specification::new().or(Condition::eq("id", 1));
        let q = compose(&users(), &spec, None, Dialect::Oracle).unwrap();
        assert_eq!(q.count.sql(), "SELECT COUNT(1) FROM users u WHERE u.id = ?");
    }
}
