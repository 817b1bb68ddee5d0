//!
//! Mapping of Rust column types onto values.
//!

use std::convert::TryFrom;

use crate::value::Value;

/// Storage kind of a column, used when decoding database rows.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Bool,
    Int32,
    Int64,
    Float64,
    Text,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int32 => "int4",
            Kind::Int64 => "int8",
            Kind::Float64 => "float8",
            Kind::Text => "text",
        }
    }

    /// Whether a non-null `value` can be stored in a column of this kind.
    pub fn admits(self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Bool, Value::Bool(_)) => true,
            (Kind::Int32, Value::Int(value)) => i32::try_from(*value).is_ok(),
            (Kind::Int64, Value::Int(_)) => true,
            (Kind::Float64, Value::Float(_)) => true,
            (Kind::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

/// Any Rust type that can be stored in a column.
///
/// Nullable columns are declared as `Option<T>`, and share the `Unit`
/// type of `T`: comparisons always take a non-null operand.
pub trait ColumnType: Sized + Send + Sync + 'static {
    /// Unit (non-nullable) value type of this column type
    type Unit: Into<Value> + Send + Sync + 'static;

    const KIND: Kind;
    const NULLABLE: bool;

    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl ColumnType for bool {
    type Unit = bool;

    const KIND: Kind = Kind::Bool;
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ColumnType for i32 {
    type Unit = i32;

    const KIND: Kind = Kind::Int32;
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(value) => i32::try_from(value).ok(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ColumnType for i64 {
    type Unit = i64;

    const KIND: Kind = Kind::Int64;
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl ColumnType for f64 {
    type Unit = f64;

    const KIND: Kind = Kind::Float64;
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ColumnType for String {
    type Unit = String;

    const KIND: Kind = Kind::Text;
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl<T> ColumnType for Option<T>
where
    T: ColumnType<Unit = T> + Into<Value>,
{
    type Unit = T;

    const KIND: Kind = T::KIND;
    const NULLABLE: bool = true;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_decodes_null_as_none() {
        assert_eq!(<Option<i32>>::from_value(Value::Null), Some(None));
        assert_eq!(<Option<i32>>::from_value(Value::Int(3)), Some(Some(3)));
        assert_eq!(i32::from_value(Value::Null), None);
    }

    #[test]
    fn out_of_range_int_does_not_decode() {
        assert_eq!(i32::from_value(Value::Int(i64::MAX)), None);
    }

    #[test]
    fn int4_admits_only_the_i32_range() {
        assert!(Kind::Int32.admits(&Value::Int(i64::from(i32::MAX))));
        assert!(!Kind::Int32.admits(&Value::Int(i64::from(i32::MAX) + 1)));
        assert!(Kind::Int64.admits(&Value::Int(i64::MAX)));
        assert!(!Kind::Text.admits(&Value::Int(1)));
        assert!(!Kind::Int64.admits(&Value::Null));
    }
}
