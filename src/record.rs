//! Record representation and data-document validation.

use serde_json::Value;

use crate::error::{Result, StudyvarError};

/// One participant's raw values, keyed by variable
pub type Record = serde_json::Map<String, Value>;

/// Validate a parsed data document and extract its records.
///
/// The document must be a JSON array of flat objects. Anything else is a
/// structural failure and nothing is committed.
pub fn records_from_document(document: Value) -> Result<Vec<Record>> {
    let Value::Array(rows) = document else {
        return Err(StudyvarError::invalid_document(
            "expected a JSON array of records",
        ));
    };

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        match row {
            Value::Object(record) => records.push(record),
            other => {
                return Err(StudyvarError::invalid_document(format!(
                    "record {i} is not an object (found {})",
                    json_type_name(&other)
                )));
            }
        }
    }
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_objects_parses() {
        let records = records_from_document(json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("a"), Some(&json!(1)));
    }

    #[test]
    fn non_array_document_is_rejected() {
        assert!(records_from_document(json!({"a": 1})).is_err());
        assert!(records_from_document(json!("rows")).is_err());
    }

    #[test]
    fn non_object_row_is_rejected() {
        let err = records_from_document(json!([{"a": 1}, 42])).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }
}
