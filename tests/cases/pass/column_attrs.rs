// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlforge::{DataKind, Entity};
use uuid::Uuid;

#[derive(Debug, Default, Entity)]
#[entity(table = "documents", schema = "archive", name = "Doc")]
pub struct Document {
    #[id]
    #[column(name = "DOC_ID")]
    pub id: Option<Uuid>,

    #[column(nullable = false, updatable = false)]
    pub title: Option<String>,

    #[column(kind = "large_text")]
    pub body: Option<String>,

    pub size: Option<Decimal>,

    #[column(insertable = false, updatable = false)]
    pub created_at: Option<NaiveDateTime>,

    pub payload: Option<Vec<u8>>,

    #[column(skip)]
    pub rendered: Vec<String>
}

fn main() {
    let d = Document::descriptor();
    assert_eq!(d.name, "Doc");
    assert_eq!(d.qualified_table(), "archive.documents");
    assert_eq!(d.columns.len(), 6);

    let id = d.primary_key().unwrap();
    assert_eq!(id.db_name, "DOC_ID");
    assert_eq!(id.kind, DataKind::Uuid);

    let title = d.column("title").unwrap();
    assert!(!title.nullable);
    assert!(!title.updatable);

    assert_eq!(d.column("body").unwrap().kind, DataKind::LargeText);
    assert_eq!(d.column("size").unwrap().kind, DataKind::Decimal);
    assert!(!d.column("created_at").unwrap().insertable);
    assert_eq!(d.column("payload").unwrap().kind, DataKind::Bytes);
    assert!(d.column("rendered").is_none());
}
