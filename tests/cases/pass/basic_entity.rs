// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use sqlforge::{DataKind, Entity, Value};

#[derive(Debug, Default, Entity)]
#[entity(table = "users")]
pub struct User {
    #[id]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub active: bool
}

fn main() {
    let descriptor = User::descriptor();
    assert_eq!(descriptor.name, "User");
    assert_eq!(descriptor.table, "users");
    assert_eq!(descriptor.columns.len(), 3);
    assert_eq!(descriptor.columns[2].kind, DataKind::Boolean);
    assert!(!descriptor.columns[2].nullable);

    let user = User {
        id: Some(7),
        ..User::default()
    };
    assert_eq!(user.get("id"), Value::Int(7));
    assert_eq!(user.get("name"), Value::Null);
}
