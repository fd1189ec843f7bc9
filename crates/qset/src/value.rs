//! The variant value carried by bound parameters and cursor fields.

use crate::error::{QsError, QsResult};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single database value.
///
/// Bound parameters are stored as `Value`s inside [`SqlFragment`](crate::SqlFragment)s,
/// and cursors report their fields as `Value`s.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Bytes),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Timestamp without time zone.
    DateTime(NaiveDateTime),
    /// Timestamp with a UTC offset.
    DateTimeTz(DateTime<FixedOffset>),
    Uuid(Uuid),
    Json(serde_json::Value),
}

/// Discriminant of a [`Value`], used for type hints and decode messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Text,
    Bytes,
    Date,
    Time,
    DateTime,
    DateTimeTz,
    Uuid,
    Json,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::DateTimeTz(_) => ValueKind::DateTimeTz,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Json(_) => ValueKind::Json,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl ValueKind {
    /// XML Schema built-in type name for this kind, prefixed with `xs:`.
    pub fn schema_type(self) -> Option<&'static str> {
        Some(match self {
            ValueKind::Null => return None,
            ValueKind::Bool => "xs:boolean",
            ValueKind::I16 => "xs:short",
            ValueKind::I32 => "xs:int",
            ValueKind::I64 => "xs:long",
            ValueKind::F32 => "xs:float",
            ValueKind::F64 => "xs:double",
            ValueKind::Decimal => "xs:decimal",
            ValueKind::Text | ValueKind::Uuid | ValueKind::Json => "xs:string",
            ValueKind::Bytes => "xs:base64Binary",
            ValueKind::Date => "xs:date",
            ValueKind::Time => "xs:time",
            ValueKind::DateTime | ValueKind::DateTimeTz => "xs:dateTime",
        })
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => Text,
    Bytes => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeTz,
    Uuid => Uuid,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTimeTz(v.fixed_offset())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::I64(i64::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Typed extraction out of a [`Value`].
///
/// Integer targets accept narrower integer variants; `Option<T>` maps
/// `Null` to `None`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> QsResult<Self>;
}

fn mismatch<T>(value: &Value, expected: &str) -> QsResult<T> {
    Err(QsError::decode(
        "",
        format!("cannot read {:?} as {expected}", value.kind()),
    ))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> QsResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::I16(n) => Ok(*n != 0),
            Value::I32(n) => Ok(*n != 0),
            Value::I64(n) => Ok(*n != 0),
            other => mismatch(other, "bool"),
        }
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::I16(n) => Ok(*n),
            Value::I32(n) => i16::try_from(*n).or_else(|_| mismatch(value, "i16")),
            Value::I64(n) => i16::try_from(*n).or_else(|_| mismatch(value, "i16")),
            other => mismatch(other, "i16"),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::I16(n) => Ok(i32::from(*n)),
            Value::I32(n) => Ok(*n),
            Value::I64(n) => i32::try_from(*n).or_else(|_| mismatch(value, "i32")),
            other => mismatch(other, "i32"),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::I16(n) => Ok(i64::from(*n)),
            Value::I32(n) => Ok(i64::from(*n)),
            Value::I64(n) => Ok(*n),
            other => mismatch(other, "i64"),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::F32(n) => Ok(*n),
            other => mismatch(other, "f32"),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::F32(n) => Ok(f64::from(*n)),
            Value::F64(n) => Ok(*n),
            Value::I16(n) => Ok(f64::from(*n)),
            Value::I32(n) => Ok(f64::from(*n)),
            other => mismatch(other, "f64"),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Decimal(d) => Ok(*d),
            Value::I16(n) => Ok(Decimal::from(*n)),
            Value::I32(n) => Ok(Decimal::from(*n)),
            Value::I64(n) => Ok(Decimal::from(*n)),
            other => mismatch(other, "Decimal"),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => mismatch(other, "String"),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => mismatch(other, "Bytes"),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.to_vec()),
            other => mismatch(other, "Vec<u8>"),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            other => mismatch(other, "NaiveDate"),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Time(t) => Ok(*t),
            other => mismatch(other, "NaiveTime"),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::DateTime(t) => Ok(*t),
            other => mismatch(other, "NaiveDateTime"),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::DateTimeTz(t) => Ok(*t),
            other => mismatch(other, "DateTime<FixedOffset>"),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::DateTimeTz(t) => Ok(t.with_timezone(&Utc)),
            Value::DateTime(t) => Ok(t.and_utc()),
            other => mismatch(other, "DateTime<Utc>"),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Uuid::parse_str(s).or_else(|_| mismatch(value, "Uuid")),
            other => mismatch(other, "Uuid"),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            Value::Text(s) => Ok(serde_json::from_str(s)?),
            other => mismatch(other, "serde_json::Value"),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> QsResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
