// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use std::{fmt, str::FromStr};

use sqlforge::{DataKind, Entity, Value};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    #[default]
    Low,
    High
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::High => "HIGH"
        })
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "HIGH" => Ok(Self::High),
            other => Err(other.to_owned())
        }
    }
}

#[derive(Debug, Default, Entity)]
#[entity(table = "tasks")]
pub struct Task {
    #[id]
    pub id: Option<i32>,
    pub priority: Priority,
    #[column(lenient)]
    pub fallback: Option<Priority>
}

fn main() {
    assert_eq!(Task::descriptor().columns[1].kind, DataKind::Enum);
    assert!(Task::descriptor().columns[2].lenient);

    let mut task = Task::default();
    task.set("priority", Value::Text("HIGH".into())).unwrap();
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.get("priority"), Value::Text("HIGH".into()));
    assert_eq!(task.get("fallback"), Value::Null);
}
