// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Bind values and field conversions.
//!
//! [`Value`] is the single currency between entities, binding plans and
//! decoded rows. Field types move in and out of it through [`ToValue`] and
//! [`FromValue`].
//!
//! # Conversion Rules
//!
//! | Target | Accepts |
//! |--------|---------|
//! | integers | `Int`, integral `Decimal`, numeric `Text` |
//! | `bool` | `Bool`, `Int` 0/1 |
//! | `Decimal` | `Decimal`, `Int`, `Float`, `Text` (empty text is zero) |
//! | `NaiveDate` | `Date`, `DateTime`, ISO-8601 `Text` |
//! | `NaiveDateTime` | `DateTime`, `Date` at midnight, ISO-8601 `Text` |
//! | `Option<T>` | `Null` as `None`, anything `T` accepts |
//!
//! Conversions are strict. Leniency is a per-column decision made by the
//! decoder, not here.

use std::{
    fmt::Display,
    io::{BufReader, Read},
    str::FromStr
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use uuid::Uuid;

use crate::error::DecodeError;

/// Chunk size used when draining large objects.
const LOB_CHUNK: usize = 8 * 1024;

/// A single bindable or decoded SQL value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer column.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Exact numeric.
    Decimal(Decimal),
    /// Character data, including enum members.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp without zone; zoned timestamps are stored as UTC.
    DateTime(NaiveDateTime),
    /// UUID.
    Uuid(Uuid),
    /// Binary data.
    Bytes(Vec<u8>)
}

impl Value {
    /// Check for SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Variant name, used in conversion errors.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Uuid(_) => "uuid",
            Self::Bytes(_) => "bytes"
        }
    }

    fn mismatch(&self, expected: &'static str) -> DecodeError {
        if self.is_null() {
            DecodeError::UnexpectedNull
        } else {
            DecodeError::TypeMismatch {
                expected,
                found: self.variant_name()
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    Uuid => Uuid,
    Vec<u8> => Bytes
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v.naive_utc())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Read a field as a [`Value`] without consuming it.
pub trait ToValue {
    /// Produce the bind value for this field.
    fn to_value(&self) -> Value;
}

impl<T: Clone + Into<Value>> ToValue for T {
    fn to_value(&self) -> Value {
        self.clone().into()
    }
}

/// Convert a decoded [`Value`] into a field type.
pub trait FromValue: Sized {
    /// Perform the conversion.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the value cannot represent `Self`.
    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some)
        }
    }
}

fn parse_text<T: FromStr>(input: &str, expected: &'static str) -> Result<T, DecodeError> {
    input.trim().parse().map_err(|_| DecodeError::Parse {
        expected,
        input: input.to_owned()
    })
}

fn integer(value: Value, expected: &'static str) -> Result<i64, DecodeError> {
    match value {
        Value::Int(v) => Ok(v),
        Value::Decimal(d) if d.fract().is_zero() => d.to_i64().ok_or(DecodeError::Parse {
            expected,
            input: d.to_string()
        }),
        Value::Text(s) => parse_text(&s, expected),
        other => Err(other.mismatch(expected))
    }
}

macro_rules! integer_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    let wide = integer(value, stringify!($ty))?;
                    <$ty>::try_from(wide).map_err(|_| DecodeError::Parse {
                        expected: stringify!($ty),
                        input:    wide.to_string()
                    })
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, u8, u16, u32);

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        integer(value, "i64")
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(s) => parse_text(&s, "bool"),
            other => Err(other.mismatch("bool"))
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Decimal(d) => d.to_f64().ok_or(DecodeError::Parse {
                expected: "f64",
                input:    d.to_string()
            }),
            Value::Text(s) => parse_text(&s, "f64"),
            other => Err(other.mismatch("f64"))
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Int(i) => Ok(Decimal::from(i)),
            Value::Float(f) => Decimal::try_from(f).map_err(|_| DecodeError::Parse {
                expected: "decimal",
                input:    f.to_string()
            }),
            Value::Text(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
            Value::Text(s) => parse_text(&s, "decimal"),
            other => Err(other.mismatch("decimal"))
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Decimal(d) => Ok(d.to_string()),
            Value::Uuid(u) => Ok(u.to_string()),
            other => Err(other.mismatch("text"))
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::Text(s) => parse_text(&s, "date"),
            other => Err(other.mismatch("date"))
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Value::Text(s) => parse_text(&s, "datetime"),
            other => Err(other.mismatch("datetime"))
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        NaiveDateTime::from_value(value).map(|dt| dt.and_utc())
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(s) => parse_text(&s, "uuid"),
            other => Err(other.mismatch("uuid"))
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(other.mismatch("bytes"))
        }
    }
}

/// Bind an enum member by its `Display` form.
pub fn enum_to_value<T: Display>(member: &T) -> Value {
    Value::Text(member.to_string())
}

/// Bind an optional enum member.
pub fn option_enum_to_value<T: Display>(member: &Option<T>) -> Value {
    member.as_ref().map_or(Value::Null, enum_to_value)
}

/// Decode an enum member by matching its textual form.
///
/// # Errors
///
/// [`DecodeError::UnknownVariant`] when no member matches.
pub fn enum_from_value<T: FromStr>(value: Value) -> Result<T, DecodeError> {
    let text = String::from_value(value)?;
    text.trim()
        .parse()
        .map_err(|_| DecodeError::UnknownVariant(text))
}

/// Decode an optional enum member.
///
/// # Errors
///
/// Same as [`enum_from_value`], NULL decodes to `None`.
pub fn option_enum_from_value<T: FromStr>(value: Value) -> Result<Option<T>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => enum_from_value(other).map(Some)
    }
}

/// Drain a character large object into text.
///
/// The value is read through a buffered reader in fixed-size chunks so
/// drivers that hand over raw bytes and drivers that hand over text take the
/// same path.
///
/// # Errors
///
/// [`DecodeError::InvalidUtf8`] for binary content that is not UTF-8.
pub fn read_large_text(value: Value) -> Result<Value, DecodeError> {
    let bytes = match value {
        Value::Null => return Ok(Value::Null),
        Value::Text(s) => s.into_bytes(),
        Value::Bytes(b) => b,
        other => return Err(other.mismatch("large text"))
    };

    let mut reader = BufReader::with_capacity(LOB_CHUNK, bytes.as_slice());
    let mut chunk = [0u8; LOB_CHUNK];
    let mut out = Vec::with_capacity(bytes.len());
    loop {
        let read = reader
            .read(&mut chunk)
            .map_err(|_| DecodeError::InvalidUtf8)?;
        if read == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..read]);
    }

    String::from_utf8(out)
        .map(Value::Text)
        .map_err(|_| DecodeError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Status {
        Active,
        Closed
    }

    impl FromStr for Status {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "ACTIVE" => Ok(Self::Active),
                "CLOSED" => Ok(Self::Closed),
                _ => Err(())
            }
        }
    }

    impl Display for Status {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Active => f.write_str("ACTIVE"),
                Self::Closed => f.write_str("CLOSED")
            }
        }
    }

    #[test]
    fn option_none_is_null() {
        let v: Value = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: Value = Some("x").into();
        assert_eq!(v, Value::Text("x".into()));
    }

    #[test]
    fn to_value_does_not_consume() {
        let name = String::from("Alice");
        assert_eq!(name.to_value(), Value::Text("Alice".into()));
        assert_eq!(name, "Alice");
    }

    #[test]
    fn integer_accepts_integral_decimal() {
        let v = Value::Decimal(Decimal::new(42, 0));
        assert_eq!(i64::from_value(v).unwrap(), 42);
    }

    #[test]
    fn integer_rejects_fraction() {
        let v = Value::Decimal(Decimal::new(425, 1));
        assert!(i64::from_value(v).is_err());
    }

    #[test]
    fn narrow_integer_overflow() {
        let err = i8::from_value(Value::Int(300)).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn bool_from_oracle_number() {
        assert!(bool::from_value(Value::Int(1)).unwrap());
        assert!(!bool::from_value(Value::Int(0)).unwrap());
        assert!(bool::from_value(Value::Int(2)).is_err());
    }

    #[test]
    fn decimal_from_empty_text_is_zero() {
        let v = Decimal::from_value(Value::Text(String::new())).unwrap();
        assert_eq!(v, Decimal::ZERO);
    }

    #[test]
    fn decimal_from_garbage_is_error() {
        let err = Decimal::from_value(Value::Text("12,5x".into())).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { expected: "decimal", .. }));
    }

    #[test]
    fn null_into_required_field() {
        assert_eq!(
            String::from_value(Value::Null).unwrap_err(),
            DecodeError::UnexpectedNull
        );
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn date_from_text() {
        let d = NaiveDate::from_value(Value::Text("2024-02-29".into())).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn datetime_from_date() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dt = NaiveDateTime::from_value(Value::Date(d)).unwrap();
        assert_eq!(dt.date(), d);
    }

    #[test]
    fn utc_round_trips_through_naive() {
        let now = Utc::now();
        let back = DateTime::<Utc>::from_value(Value::from(now)).unwrap();
        assert_eq!(back, now);
    }

    #[test]
    fn enum_members() {
        assert_eq!(enum_to_value(&Status::Active), Value::Text("ACTIVE".into()));
        let s: Status = enum_from_value(Value::Text("CLOSED".into())).unwrap();
        assert_eq!(s, Status::Closed);
        let err = enum_from_value::<Status>(Value::Text("OPEN".into())).unwrap_err();
        assert_eq!(err, DecodeError::UnknownVariant("OPEN".into()));
    }

    #[test]
    fn optional_enum_members() {
        assert_eq!(option_enum_to_value::<Status>(&None), Value::Null);
        let s: Option<Status> = option_enum_from_value(Value::Null).unwrap();
        assert!(s.is_none());
    }

    #[test]
    fn large_text_from_bytes() {
        let body = "x".repeat(LOB_CHUNK * 2 + 17);
        let v = read_large_text(Value::Bytes(body.clone().into_bytes())).unwrap();
        assert_eq!(v, Value::Text(body));
    }

    #[test]
    fn large_text_rejects_invalid_utf8() {
        let err = read_large_text(Value::Bytes(vec![0xff, 0xfe])).unwrap_err();
        assert_eq!(err, DecodeError::InvalidUtf8);
    }

    #[test]
    fn large_text_keeps_null() {
        assert!(read_large_text(Value::Null).unwrap().is_null());
    }
}
