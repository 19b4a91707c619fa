// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Naming-convention query resolution for derived methods.
//!
//! A derived method encodes its query in its name:
//!
//! ```text
//! find[Entity][All][By<Predicate>{(And|Or)<Predicate>}][OrderBy<Field>[Asc|Desc]...]
//! count[Entity][All][By<Predicate>{(And|Or)<Predicate>}]
//! ```
//!
//! A predicate is a field name followed by an optional operator:
//!
//! | Operator | SQL | Parameters |
//! |----------|-----|------------|
//! | *(none)*, `Is`, `Equal` | `= :p` | 1 |
//! | `Not`, `NotEqual` | `<> :p` | 1 |
//! | `In` / `NotIn` | `IN (:p)` / `NOT IN (:p)` | 1 list |
//! | `Like` / `NotLike` | `LIKE :p` / `NOT LIKE :p` | 1 |
//! | `Between` / `NotBetween` | `BETWEEN :a AND :b` | 2 |
//! | `LessThan`, `GreaterThan` | `<`, `>` | 1 |
//! | `LessEqual`, `GreaterEqual` | `<=`, `>=` | 1 |
//! | `Null`, `IsNull` / `NotNull`, `IsNotNull` | `IS NULL` / `IS NOT NULL` | 0 |
//!
//! Parameters are consumed in declaration order. The output is a template
//! with `:param` tokens, compiled by the same code path as native queries.
//!
//! ```rust,ignore
//! let method = MethodDescriptor::new("findByNameAndAgeGreaterThan", ReturnShape::List)
//!     .param(ParamDescriptor::value("name"))
//!     .param(ParamDescriptor::value("age"));
//! assert_eq!(
//!     ConventionResolver.resolve(&users, &method)?,
//!     "SELECT u.id, u.name, u.age FROM users u WHERE u.name = :name AND u.age > :age"
//! );
//! ```

use crate::{
    error::CodeGenError,
    metadata::{ColumnDescriptor, EntityDescriptor},
    method::{MethodDescriptor, ParamDescriptor, ReturnShape},
    page::SortDirection
};

/// Turns a derived method into a base query template.
pub trait NamingResolver: Send + Sync {
    /// Produce the SELECT or COUNT template for `method`.
    ///
    /// # Errors
    ///
    /// [`CodeGenError`] when the name cannot be mapped onto the entity.
    fn resolve(
        &self,
        descriptor: &EntityDescriptor,
        method: &MethodDescriptor
    ) -> Result<String, CodeGenError>;
}

/// Resolver for the `find…By…` naming convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    In,
    NotIn,
    Like,
    NotLike,
    Between,
    NotBetween,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    IsNull,
    IsNotNull
}

/// Operator suffixes, longest first within each family.
const OPERATORS: &[(&[&str], Operator)] = &[
    (&["Is", "Not", "Null"], Operator::IsNotNull),
    (&["Not", "Null"], Operator::IsNotNull),
    (&["Is", "Null"], Operator::IsNull),
    (&["Null"], Operator::IsNull),
    (&["Not", "Between"], Operator::NotBetween),
    (&["Between"], Operator::Between),
    (&["Not", "In"], Operator::NotIn),
    (&["In"], Operator::In),
    (&["Not", "Like"], Operator::NotLike),
    (&["Like"], Operator::Like),
    (&["Less", "Than", "Equal"], Operator::LessEqual),
    (&["Less", "Equal"], Operator::LessEqual),
    (&["Greater", "Than", "Equal"], Operator::GreaterEqual),
    (&["Greater", "Equal"], Operator::GreaterEqual),
    (&["Less", "Than"], Operator::LessThan),
    (&["Greater", "Than"], Operator::GreaterThan),
    (&["Not", "Equal"], Operator::NotEqual),
    (&["Not"], Operator::NotEqual),
    (&["Is", "Equal"], Operator::Equal),
    (&["Equal"], Operator::Equal),
    (&["Is"], Operator::Equal)
];

impl Operator {
    const fn arity(self) -> usize {
        match self {
            Self::IsNull | Self::IsNotNull => 0,
            Self::Between | Self::NotBetween => 2,
            _ => 1
        }
    }

    const fn takes_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    fn render(self, column: &str, params: &[&ParamDescriptor]) -> String {
        let p = |i: usize| format!(":{}", params[i].name);
        match self {
            Self::Equal => format!("{column} = {}", p(0)),
            Self::NotEqual => format!("{column} <> {}", p(0)),
            Self::In => format!("{column} IN ({})", p(0)),
            Self::NotIn => format!("{column} NOT IN ({})", p(0)),
            Self::Like => format!("{column} LIKE {}", p(0)),
            Self::NotLike => format!("{column} NOT LIKE {}", p(0)),
            Self::Between => format!("{column} BETWEEN {} AND {}", p(0), p(1)),
            Self::NotBetween => format!("{column} NOT BETWEEN {} AND {}", p(0), p(1)),
            Self::LessThan => format!("{column} < {}", p(0)),
            Self::GreaterThan => format!("{column} > {}", p(0)),
            Self::LessEqual => format!("{column} <= {}", p(0)),
            Self::GreaterEqual => format!("{column} >= {}", p(0)),
            Self::IsNull => format!("{column} IS NULL"),
            Self::IsNotNull => format!("{column} IS NOT NULL")
        }
    }
}

impl NamingResolver for ConventionResolver {
    fn resolve(
        &self,
        descriptor: &EntityDescriptor,
        method: &MethodDescriptor
    ) -> Result<String, CodeGenError> {
        let fail = |reason: String| CodeGenError::UnresolvableMethod {
            method: method.name.clone(),
            reason
        };

        let (counting, rest) = if let Some(rest) = method.name.strip_prefix("count") {
            (true, rest)
        } else if let Some(rest) = method.name.strip_prefix("find") {
            (false, rest)
        } else {
            return Err(fail("derived methods start with `find` or `count`".into()));
        };
        match (counting, method.return_shape) {
            (true, ReturnShape::Count)
            | (false, ReturnShape::Single | ReturnShape::List | ReturnShape::Page) => {}
            (_, shape) => {
                return Err(fail(format!("`{shape:?}` does not fit a derived query")));
            }
        }

        let rest = strip_word(rest, &descriptor.name);
        let rest = strip_word(rest, "All");
        let (criteria, order) = match rest.find("OrderBy") {
            Some(at) => (&rest[..at], Some(&rest[at + "OrderBy".len()..])),
            None => (rest, None)
        };

        let alias = descriptor.alias();
        let mut sql = if counting {
            format!(
                "SELECT COUNT(1) FROM {} {alias}",
                descriptor.qualified_table()
            )
        } else {
            format!(
                "SELECT {} FROM {} {alias}",
                descriptor.select_list(),
                descriptor.qualified_table()
            )
        };

        let params: Vec<&ParamDescriptor> = method.bindable_params().collect();
        let mut next = 0usize;

        if !criteria.is_empty() {
            let Some(criteria) = criteria.strip_prefix("By").filter(|c| !c.is_empty()) else {
                return Err(fail(format!("unexpected `{criteria}` before the criteria")));
            };
            sql.push_str(" WHERE ");
            for (index, (connector, group)) in split_connectors(&words(criteria)).into_iter().enumerate() {
                if group.is_empty() {
                    return Err(fail("empty predicate".into()));
                }
                let (column, operator) = match_predicate(descriptor, &group)
                    .ok_or_else(|| fail(format!("no column matches `{}`", group.concat())))?;

                let arity = operator.arity();
                if next + arity > params.len() {
                    return Err(fail(format!(
                        "`{}` needs {arity} more parameter(s)",
                        group.concat()
                    )));
                }
                let taken = &params[next..next + arity];
                for param in taken {
                    if param.is_list != operator.takes_list() {
                        return Err(fail(format!(
                            "parameter `{}` does not fit `{:?}`",
                            param.name, operator
                        )));
                    }
                }
                next += arity;

                if index > 0 {
                    sql.push_str(connector);
                }
                sql.push_str(&operator.render(&format!("{alias}.{}", column.db_name), taken));
            }
        }

        if let Some(unused) = params.get(next) {
            return Err(CodeGenError::UnboundParameter {
                method: method.name.clone(),
                param:  unused.name.clone()
            });
        }

        if let Some(order) = order {
            let entries = parse_order(descriptor, order).map_err(fail)?;
            if !counting {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(column, dir)| format!("{alias}.{} {}", column.db_name, dir.as_sql()))
                    .collect();
                sql.push_str(" ORDER BY ");
                sql.push_str(&rendered.join(", "));
            }
        }

        Ok(sql)
    }
}

/// Drop `word` from the front of `rest` when criteria, ordering or the end
/// follows it.
fn strip_word<'a>(rest: &'a str, word: &str) -> &'a str {
    match rest.strip_prefix(word) {
        Some(tail) if tail.is_empty() || tail.starts_with("By") || tail.starts_with("OrderBy") => {
            tail
        }
        _ => rest
    }
}

/// Split on camel-case boundaries.
fn words(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices().skip(1) {
        if c.is_ascii_uppercase() {
            out.push(&s[start..i]);
            start = i;
        }
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

/// Group words into predicates, each with the connector that precedes it.
fn split_connectors<'a>(words: &[&'a str]) -> Vec<(&'static str, Vec<&'a str>)> {
    let mut groups = vec![(" AND ", Vec::new())];
    for &word in words {
        match word {
            "And" => groups.push((" AND ", Vec::new())),
            "Or" => groups.push((" OR ", Vec::new())),
            _ => {
                if let Some((_, group)) = groups.last_mut() {
                    group.push(word);
                }
            }
        }
    }
    groups
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_column<'d>(descriptor: &'d EntityDescriptor, words: &[&str]) -> Option<&'d ColumnDescriptor> {
    let wanted = normalize(&words.concat());
    descriptor
        .columns
        .iter()
        .find(|c| normalize(&c.field_name) == wanted || normalize(&c.db_name) == wanted)
}

/// Pick the operator suffix that leaves a known field in front of it,
/// falling back to the whole group as a field compared with `=`.
fn match_predicate<'d>(
    descriptor: &'d EntityDescriptor,
    group: &[&str]
) -> Option<(&'d ColumnDescriptor, Operator)> {
    for (suffix, operator) in OPERATORS {
        if group.len() > suffix.len()
            && group.ends_with(suffix)
            && let Some(column) = find_column(descriptor, &group[..group.len() - suffix.len()])
        {
            return Some((column, *operator));
        }
    }
    find_column(descriptor, group).map(|column| (column, Operator::Equal))
}

fn parse_order<'d>(
    descriptor: &'d EntityDescriptor,
    order: &str
) -> Result<Vec<(&'d ColumnDescriptor, SortDirection)>, String> {
    let mut entries = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut flush = |pending: &mut Vec<&str>, dir: SortDirection| -> Result<(), String> {
        let column = find_column(descriptor, pending)
            .ok_or_else(|| format!("no column matches order field `{}`", pending.concat()))?;
        entries.push((column, dir));
        pending.clear();
        Ok(())
    };

    for word in words(order) {
        match word {
            "Asc" if !pending.is_empty() => flush(&mut pending, SortDirection::Asc)?,
            "Desc" if !pending.is_empty() => flush(&mut pending, SortDirection::Desc)?,
            _ => pending.push(word)
        }
    }
    if !pending.is_empty() {
        flush(&mut pending, SortDirection::Asc)?;
    }
    if entries.is_empty() {
        return Err("`OrderBy` without a field".into());
    }
    Ok(entries)
}
