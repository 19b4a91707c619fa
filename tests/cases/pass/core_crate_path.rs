// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use sqlforge::Entity;

#[derive(Debug, Default, Entity)]
#[entity(table = "tags", crate = "sqlforge_core")]
pub struct Tag {
    #[id]
    pub id: Option<i64>,
    pub label: String
}

fn main() {
    assert_eq!(<Tag as sqlforge_core::Entity>::descriptor().table, "tags");
}
