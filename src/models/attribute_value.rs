use std::fmt;

use serde::{Deserialize, Serialize};

use super::column_type::ColumnType;

/// A typed attribute value held by a record.
///
/// The wire carries every value as text; the declared column type decides
/// which variant an assignment lands in (see [`AttributeValue::coerce`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String value.
    Text(String),
    /// Whole-number value.
    Integer(i64),
    /// Fractional value.
    Decimal(f64),
}

impl AttributeValue {
    /// Coerce this value into the semantic type of a column bucket.
    ///
    /// Text that does not parse as the declared numeric type is kept
    /// unchanged rather than collapsed to zero.
    pub fn coerce(self, column_type: ColumnType) -> AttributeValue {
        match column_type {
            ColumnType::Text => AttributeValue::Text(self.to_string()),
            ColumnType::Integer => match self {
                AttributeValue::Integer(_) => self,
                AttributeValue::Decimal(value) => AttributeValue::Integer(value as i64),
                AttributeValue::Text(raw) => match raw.trim().parse::<i64>() {
                    Ok(value) => AttributeValue::Integer(value),
                    Err(_) => AttributeValue::Text(raw),
                },
            },
            ColumnType::Decimal => match self {
                AttributeValue::Decimal(_) => self,
                AttributeValue::Integer(value) => AttributeValue::Decimal(value as f64),
                AttributeValue::Text(raw) => match raw.trim().parse::<f64>() {
                    Ok(value) => AttributeValue::Decimal(value),
                    Err(_) => AttributeValue::Text(raw),
                },
            },
            ColumnType::Opaque => self,
        }
    }

    /// Borrow the string value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The integer value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The decimal value, if this is a decimal.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            AttributeValue::Decimal(value) => Some(*value),
            _ => None,
        }
    }
}

/// Renders the value the way it is written onto the wire.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(value) => f.write_str(value),
            AttributeValue::Integer(value) => write!(f, "{value}"),
            AttributeValue::Decimal(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(i64::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Decimal(value)
    }
}
