// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Page requests and page results.
//!
//! Page numbers are 1-based. A request renders to an `ORDER BY` clause
//! followed by the dialect's row-limiting clause:
//!
//! | Dialect | Rendering of `Pageable::new(3, 10).sort_by("name", Desc)` |
//! |---------|-------------------------------------------------------------|
//! | Postgres, MySQL | `ORDER BY u.name DESC LIMIT 10 OFFSET 20` |
//! | SQL Server, Oracle | `ORDER BY u.name DESC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY` |

use serde::{Deserialize, Serialize};

use crate::{
    dialect::Dialect,
    error::{Error, Result},
    metadata::EntityDescriptor
};

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9).
    #[default]
    Asc,

    /// Descending (Z-A, 9-0).
    Desc
}

impl SortDirection {
    /// Convert to SQL keyword.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC"
        }
    }
}

/// One ORDER BY entry, by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Entity field name (or column name).
    pub field:     String,
    /// Direction.
    pub direction: SortDirection
}

/// Page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    /// 1-based page number.
    pub page_number: u32,
    /// Rows per page.
    pub page_size:   u32,
    /// ORDER BY entries in priority order.
    #[serde(default)]
    pub sort:        Vec<Sort>
}

impl Pageable {
    /// Request page `page_number` (1-based) of `page_size` rows.
    #[must_use]
    pub const fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            sort: Vec::new()
        }
    }

    /// Add an ORDER BY entry.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(Sort {
            field: field.into(),
            direction
        });
        self
    }

    /// Rows to skip.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPage`] for page 0 or size 0.
    pub fn offset(&self) -> Result<u64> {
        if self.page_size == 0 {
            return Err(Error::InvalidPage("page size must be positive".into()));
        }
        if self.page_number == 0 {
            return Err(Error::InvalidPage("page numbers start at 1".into()));
        }
        Ok(u64::from(self.page_number - 1) * u64::from(self.page_size))
    }

    /// Render `ORDER BY … LIMIT/OFFSET`.
    ///
    /// Sort fields are mapped to columns through the descriptor and
    /// qualified with `alias` when given.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPage`] for page 0 or size 0
    /// - [`Error::UnknownField`] for a sort field with no column
    pub fn to_sql(
        &self,
        dialect: Dialect,
        descriptor: &EntityDescriptor,
        alias: Option<&str>
    ) -> Result<String> {
        self.render(dialect, descriptor, alias, false)
    }

    /// Render the page clause for a query that may already be ordered.
    ///
    /// With `ordered`, sort entries continue the existing `ORDER BY` list
    /// after a comma instead of opening a new one.
    pub(crate) fn render(
        &self,
        dialect: Dialect,
        descriptor: &EntityDescriptor,
        alias: Option<&str>,
        ordered: bool
    ) -> Result<String> {
        let offset = self.offset()?;
        let mut parts = Vec::with_capacity(self.sort.len());
        for sort in &self.sort {
            let column = &descriptor.column_for(&sort.field)?.db_name;
            let column = match alias {
                Some(alias) => format!("{alias}.{column}"),
                None => column.clone()
            };
            parts.push(format!("{column} {}", sort.direction.as_sql()));
        }

        let mut sql = String::new();
        if !parts.is_empty() {
            sql.push_str(if ordered { ", " } else { "ORDER BY " });
            sql.push_str(&parts.join(", "));
            sql.push(' ');
        } else if ordered {
            sql.push(' ');
        } else if dialect.requires_order_for_offset() {
            sql.push_str("ORDER BY (SELECT NULL) ");
        }
        sql.push_str(&dialect.pagination_clause(u64::from(self.page_size), offset));
        Ok(sql)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub content:        Vec<T>,
    /// Rows matching the filter across all pages.
    pub total_elements: u64,
    /// 1-based page number.
    pub page_number:    u32,
    /// Requested page size.
    pub page_size:      u32
}

impl<T> Page<T> {
    /// Assemble a page.
    #[must_use]
    pub fn new(content: Vec<T>, total_elements: u64, request: &Pageable) -> Self {
        Self {
            content,
            total_elements,
            page_number: request.page_number,
            page_size: request.page_size
        }
    }

    /// Number of pages; zero when this page is empty.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.content.is_empty() || self.page_size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.page_size))
    }

    /// Rows on this page.
    #[must_use]
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Check for the first page.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.page_number == 1
    }

    /// Check for the last page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        let size = u64::from(self.page_size);
        u64::from(self.page_number) * size >= self.total_elements || size > self.total_elements
    }

    /// Transform the content, keeping totals.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content:        self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page_number:    self.page_number,
            page_size:      self.page_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ColumnDescriptor, DataKind};

    fn users() -> EntityDescriptor {
        EntityDescriptor::new("User", "users")
            .with_column(ColumnDescriptor::new("id", DataKind::Integer).primary_key())
            .with_column(ColumnDescriptor::new("full_name", DataKind::Text).db_name("FULL_NAME"))
    }

    #[test]
    fn sort_direction_sql() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
        assert_eq!(SortDirection::default(), SortDirection::Asc);
    }

    #[test]
    fn offset_is_one_based() {
        assert_eq!(Pageable::new(1, 25).offset().unwrap(), 0);
        assert_eq!(Pageable::new(3, 25).offset().unwrap(), 50);
    }

    #[test]
    fn page_zero_rejected() {
        assert!(matches!(
            Pageable::new(0, 10).offset(),
            Err(Error::InvalidPage(_))
        ));
        assert!(Pageable::new(1, 0).offset().is_err());
    }

    #[test]
    fn postgres_sql() {
        let p = Pageable::new(3, 10).sort_by("full_name", SortDirection::Desc);
        assert_eq!(
            p.to_sql(Dialect::Postgres, &users(), Some("u")).unwrap(),
            "ORDER BY u.FULL_NAME DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn oracle_sql_unqualified() {
        let p = Pageable::new(2, 5)
            .sort_by("full_name", SortDirection::Asc)
            .sort_by("id", SortDirection::Desc);
        assert_eq!(
            p.to_sql(Dialect::Oracle, &users(), None).unwrap(),
            "ORDER BY FULL_NAME ASC, id DESC OFFSET 5 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn sqlserver_needs_order() {
        let p = Pageable::new(1, 5);
        assert_eq!(
            p.to_sql(Dialect::SqlServer, &users(), None).unwrap(),
            "ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
        );
        assert_eq!(
            p.to_sql(Dialect::MySql, &users(), None).unwrap(),
            "LIMIT 5 OFFSET 0"
        );
    }

    #[test]
    fn continues_existing_order() {
        let p = Pageable::new(1, 5).sort_by("id", SortDirection::Desc);
        assert_eq!(
            p.render(Dialect::Postgres, &users(), Some("u"), true).unwrap(),
            ", u.id DESC LIMIT 5 OFFSET 0"
        );
        assert_eq!(
            Pageable::new(1, 5)
                .render(Dialect::SqlServer, &users(), None, true)
                .unwrap(),
            " OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn unknown_sort_field() {
        let p = Pageable::new(1, 5).sort_by("nickname", SortDirection::Asc);
        assert!(matches!(
            p.to_sql(Dialect::Postgres, &users(), None),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn page_arithmetic() {
        let page = Page::new(vec![1, 2, 3], 23, &Pageable::new(1, 3));
        assert_eq!(page.total_pages(), 8);
        assert_eq!(page.number_of_elements(), 3);
        assert!(page.is_first());
        assert!(!page.is_last());
    }

    #[test]
    fn last_page() {
        let page = Page::new(vec![1, 2], 8, &Pageable::new(3, 3));
        assert!(page.is_last());
        assert!(!page.is_first());
    }

    #[test]
    fn size_larger_than_total_is_last() {
        let page = Page::new(vec![1], 1, &Pageable::new(1, 50));
        assert!(page.is_last());
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn empty_page_has_no_pages() {
        let page: Page<i32> = Page::new(vec![], 40, &Pageable::new(9, 5));
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn map_keeps_totals() {
        let page = Page::new(vec![1, 2], 10, &Pageable::new(1, 2)).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total_elements, 10);
    }

    #[test]
    fn pageable_deserializes_without_sort() {
        let p: Pageable = serde_json::from_str(r#"{"page_number":2,"page_size":20}"#).unwrap();
        assert_eq!(p, Pageable::new(2, 20));
    }
}
