// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Derived entities flowing through synthesis, decoding and a session.

use std::{collections::VecDeque, fmt, str::FromStr, sync::Mutex};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlforge::{DecodeError, decode_row, prelude::*};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[default]
    Active,
    Frozen
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Frozen => "FROZEN"
        })
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "FROZEN" => Ok(Self::Frozen),
            other => Err(other.to_owned())
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[entity(table = "bank_accounts", schema = "ledger", name = "Account")]
pub struct BankAccount {
    #[id]
    pub id: Option<i64>,

    #[column(name = "ACCOUNT_NO", updatable = false)]
    pub number: Option<String>,

    pub owner: Option<String>,

    pub balance: Option<Decimal>,

    pub status: Option<Status>,

    #[column(lenient)]
    pub previous: Option<Status>,

    #[column(insertable = false, updatable = false)]
    pub opened_at: Option<NaiveDateTime>,

    #[column(skip)]
    pub cache: Vec<String>
}

fn account() -> BankAccount {
    BankAccount {
        number: Some("A-1".into()),
        balance: Some(Decimal::new(1050, 2)),
        status: Some(Status::Active),
        cache: vec!["ignored".into()],
        ..BankAccount::default()
    }
}

#[derive(Default)]
struct Scripted {
    rows: Mutex<VecDeque<Vec<Row>>>,
    sql:  Mutex<Vec<String>>
}

impl Scripted {
    fn rows(self, rows: Vec<Row>) -> Self {
        self.rows.lock().unwrap().push_back(rows);
        self
    }

    fn sql(&self, index: usize) -> String {
        self.sql.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Executor for Scripted {
    async fn execute(&self, statement: &Statement) -> sqlforge::Result<u64> {
        self.sql.lock().unwrap().push(statement.sql().to_owned());
        Ok(1)
    }

    async fn query(&self, statement: &Statement) -> sqlforge::Result<Vec<Row>> {
        self.sql.lock().unwrap().push(statement.sql().to_owned());
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }
}

#[test]
fn descriptor_follows_attributes() {
    let d = BankAccount::descriptor();
    assert_eq!(d.name, "Account");
    assert_eq!(d.qualified_table(), "ledger.bank_accounts");
    assert_eq!(d.columns.len(), 7);
    assert_eq!(d.column("number").unwrap().db_name, "ACCOUNT_NO");
    assert_eq!(d.column("status").unwrap().kind, DataKind::Enum);
    assert!(d.column("previous").unwrap().lenient);
    assert!(d.column("cache").is_none());
    assert!(d.validate().is_ok());
}

#[test]
fn accessors_convert_through_value() {
    let mut acc = account();
    assert_eq!(acc.get("status"), Value::Text("ACTIVE".into()));
    assert_eq!(acc.get("cache"), Value::Null);

    acc.set("status", Value::Text("FROZEN".into())).unwrap();
    assert_eq!(acc.status, Some(Status::Frozen));
    acc.set("id", Value::Int(9)).unwrap();
    assert_eq!(acc.id, Some(9));
    assert!(matches!(
        acc.set("cache", Value::Null),
        Err(DecodeError::UnknownField(_))
    ));
}

#[test]
fn insert_skips_nulls_and_read_only_columns() {
    let stmt = synthesize_insert(&account(), Dialect::Postgres).unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO ledger.bank_accounts (ACCOUNT_NO, balance, status) VALUES ($1, $2, $3) RETURNING id"
    );
    assert_eq!(
        stmt.bindings().values(),
        vec![
            Value::Text("A-1".into()),
            Value::Decimal(Decimal::new(1050, 2)),
            Value::Text("ACTIVE".into())
        ]
    );
}

#[test]
fn update_leaves_fixed_columns_alone() {
    let acc = BankAccount {
        id: Some(5),
        owner: Some("Bob".into()),
        ..account()
    };
    let stmt = synthesize_update(&acc, Dialect::SqlServer).unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE ledger.bank_accounts SET owner = @p1, balance = @p2, status = @p3 WHERE id = @p4"
    );
}

#[test]
fn decode_keeps_lenient_defaults() {
    let row = Row::new()
        .with("id", 3i64)
        .with("account_no", "B-2")
        .with("status", "FROZEN")
        .with("previous", "CLOSED");
    let acc: BankAccount = decode_row(&row, Dialect::MySql).unwrap();
    assert_eq!(acc.id, Some(3));
    assert_eq!(acc.number.as_deref(), Some("B-2"));
    assert_eq!(acc.status, Some(Status::Frozen));
    assert_eq!(acc.previous, None);
}

#[test]
fn decode_rejects_unknown_strict_enum() {
    let row = Row::new().with("id", 3i64).with("status", "CLOSED");
    let err = decode_row::<BankAccount>(&row, Dialect::MySql).unwrap_err();
    assert!(matches!(err, Error::Decode { ref column, .. } if column == "status"));
}

#[tokio::test]
async fn session_insert_fills_generated_key() {
    let session = Session::new(
        Scripted::default().rows(vec![Row::new().with("id", 42i64)]),
        Dialect::Postgres
    );
    let mut acc = account();
    let affected = session.insert(&mut acc).await.unwrap();
    assert_eq!(affected, 1);
    assert_eq!(acc.id, Some(42));
}

#[tokio::test]
async fn derived_method_on_derived_entity() {
    let registry = RegistryBuilder::new()
        .entity::<BankAccount>()
        .unwrap()
        .method(
            "Account",
            MethodDescriptor::new("findByStatus", ReturnShape::List)
                .param(ParamDescriptor::value("status"))
        )
        .unwrap()
        .build();
    let method = registry.method("Account", "findByStatus").unwrap();

    let session = Session::new(
        Scripted::default().rows(vec![
            Row::new().with("id", 1i64).with("status", "FROZEN")
        ]),
        Dialect::MySql
    );
    let found = session
        .run::<BankAccount>(method, &[Argument::value(Status::Frozen.to_string())])
        .await
        .unwrap()
        .into_list()
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status, Some(Status::Frozen));
    assert_eq!(
        session.executor().sql(0),
        "SELECT ba.id, ba.ACCOUNT_NO, ba.owner, ba.balance, ba.status, ba.previous, ba.opened_at \
         FROM ledger.bank_accounts ba WHERE ba.status = ?"
    );
}
