//! Tabular view of records shared by every renderer.

use perceiver_extract::Record;
use serde_json::Value;

use crate::errors::OutputError;

/// Header taken from the first record's keys, then one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rows {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl Rows {
    pub fn from_records(records: &[Record]) -> Result<Self, OutputError> {
        let objects = records
            .iter()
            .map(|record| match serde_json::to_value(record)? {
                Value::Object(map) => Ok(map),
                other => Err(OutputError::Encode(format!(
                    "record did not serialize to an object: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let header: Vec<String> = objects
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();
        let body = objects
            .iter()
            .map(|object| {
                header
                    .iter()
                    .map(|key| object.get(key).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok(Self { header, body })
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Header row followed by the body.
    pub fn with_header(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.body.iter().cloned())
            .collect()
    }
}

/// Textual form of one value; nested values render as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_follows_record_field_order() {
        let rows = Rows::from_records(&[Record {
            name: "A".into(),
            url: "https://a.example".into(),
            description: "d".into(),
            rank: 1,
        }])
        .unwrap();
        assert_eq!(rows.header, vec!["name", "url", "description", "rank"]);
        assert_eq!(rows.body[0], vec!["A", "https://a.example", "d", "1"]);
    }

    #[test]
    fn nested_values_render_as_text() {
        assert_eq!(cell_text(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!(true)), "true");
    }
}
