//! Decoded observation values and rows.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single decoded cell: a number, text, or a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Char(String),
    /// A recognized SAS missing value. Serializes as JSON null.
    Missing,
}

impl Value {
    /// The numeric value, if present.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// The text value, if present.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Char(v) => Some(v),
            _ => None,
        }
    }

    /// True for missing numeric values.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The value rendered as a CSV field. Missing renders empty.
    #[must_use]
    pub(crate) fn csv_field(&self) -> String {
        match self {
            Self::Num(v) => format!("{v}"),
            Self::Char(v) => v.clone(),
            Self::Missing => String::new(),
        }
    }

    /// The value's string form used as a count key; missing maps to
    /// the literal key "null".
    #[must_use]
    pub(crate) fn count_key(&self) -> String {
        match self {
            Self::Num(v) => format!("{v}"),
            Self::Char(v) => v.clone(),
            Self::Missing => "null".to_string(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Num(v) => serializer.serialize_f64(*v),
            Self::Char(v) => serializer.serialize_str(v),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Char(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Char(v)
    }
}

/// One decoded observation, shaped per [`crate::RowFormat`].
///
/// Object rows keep column order as pairs rather than a map so the
/// on-disk order survives serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Row {
    /// Number of values in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Array(values) => values.len(),
            Self::Object(pairs) => pairs.len(),
        }
    }

    /// True when the row carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a value by column name (object rows only).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Array(_) => None,
            Self::Object(pairs) => pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
        }
    }

    /// Iterate the row's values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        let array_iter: Box<dyn Iterator<Item = &Value>> = match self {
            Self::Array(values) => Box::new(values.iter()),
            Self::Object(pairs) => Box::new(pairs.iter().map(|(_, value)| value)),
        };
        array_iter
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Num(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert!(Value::Missing.is_missing());
        assert!(!Value::Num(0.0).is_missing());
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(Value::Num(64.0).csv_field(), "64");
        assert_eq!(Value::Num(171.7).csv_field(), "171.7");
        assert_eq!(Value::from("min").csv_field(), "min");
        assert_eq!(Value::Missing.csv_field(), "");
    }

    #[test]
    fn test_count_key_for_missing() {
        assert_eq!(Value::Missing.count_key(), "null");
        assert_eq!(Value::Num(2.0).count_key(), "2");
    }

    #[test]
    fn test_row_serialization() {
        let array = Row::Array(vec![Value::from("min"), Value::Num(64.0), Value::Missing]);
        assert_eq!(
            serde_json::to_string(&array).unwrap(),
            r#"["min",64.0,null]"#
        );

        let object = Row::Object(vec![
            ("POP".to_string(), Value::from("min")),
            ("SEEDWT".to_string(), Value::Num(64.0)),
        ]);
        assert_eq!(
            serde_json::to_string(&object).unwrap(),
            r#"{"POP":"min","SEEDWT":64.0}"#
        );
    }

    #[test]
    fn test_row_get() {
        let row = Row::Object(vec![("POP".to_string(), Value::from("max"))]);
        assert_eq!(row.get("POP"), Some(&Value::from("max")));
        assert_eq!(row.get("REP"), None);
    }
}
