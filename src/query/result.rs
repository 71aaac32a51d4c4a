//! Result rows for query execution

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::codec::Value;

/// One output row: ordered (label, value) pairs.
///
/// Projection rows are labelled by column name, aggregate rows by
/// `FUNC(arg)`. Every row of one result shares the same labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: Value) {
        self.fields.push((label.into(), value));
    }

    /// Looks up a field by label
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.fields.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Serializes as a JSON object with keys in field order
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_and_order() {
        let mut row = Row::new();
        row.push("name", Value::from("Alice"));
        row.push("age", Value::Int(28));

        assert_eq!(row.get("age"), Some(&Value::Int(28)));
        assert_eq!(row.get("salary"), None);
        assert_eq!(row.labels().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_serializes_in_field_order() {
        let row: Row = vec![
            ("z".to_string(), Value::Int(1)),
            ("a".to_string(), Value::Float(2.5)),
            ("m".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2.5,"m":null}"#);
    }
}
