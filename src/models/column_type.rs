use serde::{Deserialize, Serialize};

/// Declared type names Zoho Reports maps to plain strings.
const TEXT_TYPE_NAMES: &[&str] = &[
    "Multi Line Text",
    "Yes/No Decision",
    "Looked Up Column",
    "Percent",
    "Plain Text",
    "Currency",
    "Date",
    "E-Mail",
    "URL",
];

/// Declared type names carrying fractional values.
const DECIMAL_TYPE_NAMES: &[&str] = &["Number", "Positive Number", "Decimal Number"];

/// Declared type names carrying whole-number values.
const INTEGER_TYPE_NAMES: &[&str] = &["Auto Number"];

/// Semantic bucket for a column's declared type.
///
/// The remote catalog reports free-form `TYPE_NAME` strings; the client
/// folds them into three buckets that decide how attribute values are
/// coerced on assignment. Anything outside the known names is `Opaque`
/// and values assigned to such columns are stored as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Text-like column; values are stored as strings.
    Text,
    /// Decimal number column; values are stored as 64-bit floats.
    Decimal,
    /// Integer number column; values are stored as 64-bit integers.
    Integer,
    /// Unrecognized declared type; values pass through untouched.
    Opaque,
}

impl ColumnType {
    /// Classify a declared `TYPE_NAME` into its semantic bucket.
    pub fn classify(type_name: &str) -> ColumnType {
        if TEXT_TYPE_NAMES.contains(&type_name) {
            ColumnType::Text
        } else if DECIMAL_TYPE_NAMES.contains(&type_name) {
            ColumnType::Decimal
        } else if INTEGER_TYPE_NAMES.contains(&type_name) {
            ColumnType::Integer
        } else {
            ColumnType::Opaque
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_text_types() {
        for name in ["Plain Text", "Multi Line Text", "Currency", "Date", "E-Mail", "URL"] {
            assert_eq!(ColumnType::classify(name), ColumnType::Text, "{name}");
        }
    }

    #[test]
    fn test_classify_number_types() {
        assert_eq!(ColumnType::classify("Number"), ColumnType::Decimal);
        assert_eq!(ColumnType::classify("Positive Number"), ColumnType::Decimal);
        assert_eq!(ColumnType::classify("Decimal Number"), ColumnType::Decimal);
        assert_eq!(ColumnType::classify("Auto Number"), ColumnType::Integer);
    }

    #[test]
    fn test_classify_unknown_type_is_opaque() {
        assert_eq!(ColumnType::classify("Geo Location"), ColumnType::Opaque);
        assert_eq!(ColumnType::classify(""), ColumnType::Opaque);
    }
}
