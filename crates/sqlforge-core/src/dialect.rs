// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Database dialect descriptor.
//!
//! One closed enum carries every dialect-specific decision the engine makes,
//! so synthesizer and decoder stay dialect-agnostic.
//!
//! | Dialect | Placeholder | Generated key | Pagination |
//! |---------|-------------|---------------|------------|
//! | `Postgres` | `$1, $2` | `RETURNING id` row | `LIMIT n OFFSET m` |
//! | `MySql` | `?` | last-insert-id side channel | `LIMIT n OFFSET m` |
//! | `SqlServer` | `@p1, @p2` | `OUTPUT INSERTED.id` row | `OFFSET m ROWS FETCH NEXT n ROWS ONLY` |
//! | `Oracle` | `?` | `RETURNING id INTO ?` OUT binding | `OFFSET m ROWS FETCH NEXT n ROWS ONLY` |
//!
//! Numbered placeholders restart at 1 for every statement.
//!
//! # Parsing
//!
//! ```rust,ignore
//! let d: Dialect = "postgresql".parse()?;
//! assert_eq!(d, Dialect::Postgres);
//! assert!("sqlite".parse::<Dialect>().is_err());
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{builder::SqlBuilder, error::CodeGenError};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    /// PostgreSQL.
    #[default]
    Postgres,

    /// MySQL and MariaDB.
    MySql,

    /// Microsoft SQL Server.
    SqlServer,

    /// Oracle Database.
    Oracle
}

/// How a database-generated primary key is read back after INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStrategy {
    /// `RETURNING <id>` appended; key arrives as a result row.
    ReturningClause,

    /// No clause; key read from the connection's last-insert-id property.
    LastInsertIdQuery,

    /// `OUTPUT INSERTED.<id>` before VALUES; key arrives as a result row.
    OutputInsertedClause,

    /// `RETURNING <id> INTO ?`; key arrives in an OUT parameter.
    ReturningIntoBinding
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Self; 4] = [Self::Postgres, Self::MySql, Self::SqlServer, Self::Oracle];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::SqlServer => "sqlserver",
            Self::Oracle => "oracle"
        }
    }

    /// Placeholder prefix (`$`, `?`, `@p`, `?`).
    #[must_use]
    pub const fn placeholder_prefix(&self) -> &'static str {
        match self {
            Self::Postgres => "$",
            Self::SqlServer => "@p",
            Self::MySql | Self::Oracle => "?"
        }
    }

    /// Check whether placeholders carry a 1-based index.
    #[must_use]
    pub const fn numbered_placeholders(&self) -> bool {
        matches!(self, Self::Postgres | Self::SqlServer)
    }

    /// Placeholder for a 1-based parameter index.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        if self.numbered_placeholders() {
            format!("{}{index}", self.placeholder_prefix())
        } else {
            self.placeholder_prefix().to_owned()
        }
    }

    /// Comma-separated run of `count` placeholders starting at `start`.
    #[must_use]
    pub fn placeholders(&self, start: usize, count: usize) -> String {
        (start..start + count)
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generated key retrieval strategy.
    #[must_use]
    pub const fn key_strategy(&self) -> KeyStrategy {
        match self {
            Self::Postgres => KeyStrategy::ReturningClause,
            Self::MySql => KeyStrategy::LastInsertIdQuery,
            Self::SqlServer => KeyStrategy::OutputInsertedClause,
            Self::Oracle => KeyStrategy::ReturningIntoBinding
        }
    }

    /// Follow-up query that reads the last identity on the same connection.
    #[must_use]
    pub const fn identity_query(&self) -> Option<&'static str> {
        match self {
            Self::MySql => Some("SELECT LAST_INSERT_ID()"),
            Self::SqlServer => Some("SELECT @@IDENTITY"),
            Self::Postgres | Self::Oracle => None
        }
    }

    /// Clause placed between the column list and `VALUES`.
    ///
    /// Only SQL Server returns keys from this position.
    #[must_use]
    pub fn output_clause(&self, id_column: &str) -> Option<String> {
        match self {
            Self::SqlServer => Some(format!("OUTPUT INSERTED.{id_column}")),
            _ => None
        }
    }

    /// Append the trailing returning clause for a generated key.
    ///
    /// Oracle allocates an OUT placeholder through the builder so its index
    /// follows the VALUES placeholders.
    pub fn append_returning(&self, builder: &mut SqlBuilder, id_column: &str) {
        match self {
            Self::Postgres => {
                builder.push(format!(" RETURNING {id_column}"));
            }
            Self::Oracle => {
                builder
                    .push(format!(" RETURNING {id_column} INTO "))
                    .bind_out(id_column);
            }
            Self::MySql | Self::SqlServer => {}
        }
    }

    /// Body of an INSERT that supplies no column at all.
    #[must_use]
    pub fn empty_insert_body(&self, id_column: &str) -> String {
        match self {
            Self::Postgres | Self::SqlServer => "DEFAULT VALUES".to_owned(),
            Self::MySql => "() VALUES ()".to_owned(),
            Self::Oracle => format!("({id_column}) VALUES (DEFAULT)")
        }
    }

    /// Row-limiting clause.
    #[must_use]
    pub fn pagination_clause(&self, limit: u64, offset: u64) -> String {
        match self {
            Self::Postgres | Self::MySql => format!("LIMIT {limit} OFFSET {offset}"),
            Self::SqlServer | Self::Oracle => {
                format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
            }
        }
    }

    /// Check whether OFFSET requires an ORDER BY.
    #[must_use]
    pub const fn requires_order_for_offset(&self) -> bool {
        matches!(self, Self::SqlServer)
    }

    /// Check whether the empty string is stored as NULL.
    #[must_use]
    pub const fn empty_string_is_null(&self) -> bool {
        matches!(self, Self::Oracle)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = CodeGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlserver" | "mssql" | "sql_server" => Ok(Self::SqlServer),
            "oracle" => Ok(Self::Oracle),
            _ => Err(CodeGenError::UnsupportedDialect(s.to_owned()))
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = CodeGenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(value: Dialect) -> Self {
        value.name().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_postgres() {
        assert_eq!(Dialect::default(), Dialect::Postgres);
    }

    #[test]
    fn postgres_placeholder() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Postgres.placeholder(12), "$12");
    }

    #[test]
    fn sqlserver_placeholder() {
        assert_eq!(Dialect::SqlServer.placeholder(3), "@p3");
    }

    #[test]
    fn bare_placeholders() {
        assert_eq!(Dialect::MySql.placeholder(7), "?");
        assert_eq!(Dialect::Oracle.placeholder(7), "?");
    }

    #[test]
    fn placeholders_run() {
        assert_eq!(Dialect::Postgres.placeholders(3, 3), "$3, $4, $5");
        assert_eq!(Dialect::MySql.placeholders(1, 2), "?, ?");
        assert_eq!(Dialect::Postgres.placeholders(1, 0), "");
    }

    #[test]
    fn key_strategies() {
        assert_eq!(Dialect::Postgres.key_strategy(), KeyStrategy::ReturningClause);
        assert_eq!(Dialect::MySql.key_strategy(), KeyStrategy::LastInsertIdQuery);
        assert_eq!(
            Dialect::SqlServer.key_strategy(),
            KeyStrategy::OutputInsertedClause
        );
        assert_eq!(
            Dialect::Oracle.key_strategy(),
            KeyStrategy::ReturningIntoBinding
        );
    }

    #[test]
    fn identity_queries() {
        assert_eq!(Dialect::MySql.identity_query(), Some("SELECT LAST_INSERT_ID()"));
        assert_eq!(Dialect::SqlServer.identity_query(), Some("SELECT @@IDENTITY"));
        assert_eq!(Dialect::Postgres.identity_query(), None);
    }

    #[test]
    fn pagination_clauses() {
        assert_eq!(
            Dialect::Postgres.pagination_clause(10, 20),
            "LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            Dialect::Oracle.pagination_clause(10, 20),
            "OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert_eq!(" oracle ".parse::<Dialect>().unwrap(), Dialect::Oracle);
    }

    #[test]
    fn parse_unknown() {
        let err = "sqlite".parse::<Dialect>().unwrap_err();
        assert_eq!(err, CodeGenError::UnsupportedDialect("sqlite".into()));
    }

    #[test]
    fn display_round_trips() {
        for d in Dialect::ALL {
            assert_eq!(d.to_string().parse::<Dialect>().unwrap(), d);
        }
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&Dialect::SqlServer).unwrap();
        assert_eq!(json, "\"sqlserver\"");
        let back: Dialect = serde_json::from_str("\"mssql\"").unwrap();
        assert_eq!(back, Dialect::SqlServer);
        assert!(serde_json::from_str::<Dialect>("\"db2\"").is_err());
    }

    #[test]
    fn oracle_returning_binds_out() {
        let mut b = SqlBuilder::new(Dialect::Oracle);
        b.push("INSERT INTO t (a) VALUES (");
        b.bind(crate::builder::BindSource::Literal, 1.into());
        b.push(")");
        Dialect::Oracle.append_returning(&mut b, "ID");
        let stmt = b.finish();
        assert_eq!(stmt.sql(), "INSERT INTO t (a) VALUES (?) RETURNING ID INTO ?");
        assert_eq!(stmt.bindings().out_positions(), vec![2]);
    }

    #[test]
    fn empty_inserts() {
        assert_eq!(Dialect::Postgres.empty_insert_body("id"), "DEFAULT VALUES");
        assert_eq!(Dialect::MySql.empty_insert_body("id"), "() VALUES ()");
        assert_eq!(
            Dialect::Oracle.empty_insert_body("ID"),
            "(ID) VALUES (DEFAULT)"
        );
    }
}
