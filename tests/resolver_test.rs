use serde_json::json;

use studyvar::resolve::{infer_schema, resolve_document};
use studyvar::{EngineConfig, SchemaSource, VariableType};

/// Test resolving a realistic JSON Schema document with mixed encodings
#[test]
fn test_json_schema_document_resolution() {
    let document = json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Derived study variables",
        "properties": {
            "R0_TCode": {
                "type": "string",
                "description": "Participant identifier",
                "x-group": "id"
            },
            "R0_BMI": {
                "type": ["number", "null"],
                "description": "Body mass index (kg/m2)",
                "x-group": "anthropometry"
            },
            "R0_AlcoholFreq": {
                "oneOf": [
                    {"type": "integer"},
                    {"const": 999, "title": "NA (never drinker)", "description": "not applicable"}
                ],
                "description": "Alcohol frequency",
                "x-group": "lifestyle"
            },
            "R0_SmokingStatus": {
                "type": ["integer", "null"],
                "enum": [0, 1, 2, null],
                "enumNames": ["Never", "Former", "Current"],
                "description": "Smoking status",
                "x-group": "lifestyle"
            },
            "R0_Parous": {
                "oneOf": [
                    {"const": 0, "title": "No"},
                    {"const": 1, "title": "Yes"}
                ],
                "description": "Ever given birth",
                "x-group": "reproductive"
            }
        },
        "x-groupLabels": {"id": "Identifier", "lifestyle": "Lifestyle & Exposures"}
    });

    let resolved = resolve_document(&document, &EngineConfig::default()).unwrap();
    assert_eq!(resolved.source, SchemaSource::File);
    assert_eq!(resolved.model.len(), 5);

    // declaration order is document order
    let keys: Vec<&str> = resolved.model.keys().collect();
    assert_eq!(
        keys,
        vec!["R0_TCode", "R0_BMI", "R0_AlcoholFreq", "R0_SmokingStatus", "R0_Parous"]
    );

    let bmi = resolved.model.get("R0_BMI").unwrap();
    assert_eq!(bmi.variable_type, VariableType::Numeric);
    assert_eq!(bmi.unit.as_deref(), Some("kg/m2"));

    // numeric-with-sentinel pattern: no codes, sentinel from the NA variant
    let alcohol = resolved.model.get("R0_AlcoholFreq").unwrap();
    assert_eq!(alcohol.variable_type, VariableType::Integer);
    assert!(alcohol.codes.is_none());
    assert_eq!(alcohol.sentinel, Some(999.0));

    let smoking = resolved.model.get("R0_SmokingStatus").unwrap();
    assert_eq!(smoking.variable_type, VariableType::Categorical);
    let codes = smoking.codes.as_ref().unwrap();
    assert_eq!(codes.get("1"), Some("Former"));
    assert_eq!(codes.len(), 3);

    let parous = resolved.model.get("R0_Parous").unwrap();
    assert_eq!(parous.variable_type, VariableType::Binary);

    // explicit label map wins, everything else is capitalized
    assert_eq!(resolved.group_labels.get("lifestyle"), Some("Lifestyle & Exposures"));
    assert_eq!(resolved.group_labels.get("anthropometry"), Some("Anthropometry"));
}

/// Test that an internal-format document survives a resolve/serialize
/// round trip unchanged
#[test]
fn test_internal_format_round_trip() {
    let document = json!({
        "pid": {"desc": "Identifier", "group": "id", "type": "string"},
        "bmi": {"desc": "Body mass index", "group": "anthropometry", "type": "numeric",
                "unit": "kg/m2", "sentinel": 999.0},
        "smoker": {"desc": "Smoking status", "group": "lifestyle", "type": "binary",
                   "codes": {"0": "No", "1": "Yes", "999": "Not known"}}
    });
    let config = EngineConfig::default();

    let first = resolve_document(&document, &config).unwrap();
    let rendered = first.model.to_internal_document();
    let second = resolve_document(&rendered, &config).unwrap();

    assert_eq!(first.model.len(), second.model.len());
    for (key, entry) in first.model.iter() {
        assert_eq!(second.model.get(key), Some(entry), "round trip changed {key}");
    }

    // code order survives the round trip
    let codes = second.model.get("smoker").unwrap().codes.as_ref().unwrap();
    assert_eq!(codes.first_code(), Some("0"));
}

/// Test group backfill from the built-in schema for ungrouped documents
#[test]
fn test_builtin_group_backfill() {
    let document = json!({
        "R0_BMI": {"desc": "BMI", "type": "numeric"},
        "R0_SmokingStatus": {"desc": "Smoking", "type": "categorical"},
        "custom_var": {"desc": "Custom", "type": "numeric"}
    });
    let resolved = resolve_document(&document, &EngineConfig::default()).unwrap();

    assert_eq!(resolved.model.get("R0_BMI").unwrap().group, "anthropometry");
    assert_eq!(resolved.model.get("R0_SmokingStatus").unwrap().group, "lifestyle");
    assert_eq!(resolved.model.get("custom_var").unwrap().group, "data");
    assert_eq!(resolved.group_labels.get("lifestyle"), Some("Lifestyle"));
}

/// Test that schema inference is deterministic over the same records
#[test]
fn test_inference_is_deterministic() {
    let records: Vec<studyvar::Record> = (0..50)
        .map(|i| {
            json!({
                "id": format!("p{i}"),
                "flag": i % 2,
                "grade": i % 7,
                "height": 150.0 + f64::from(i) * 0.6
            })
            .as_object()
            .unwrap()
            .clone()
        })
        .collect();
    let config = EngineConfig::default();

    let first = infer_schema(&records, &config);
    let second = infer_schema(&records, &config);
    assert_eq!(
        first.model.to_internal_document(),
        second.model.to_internal_document()
    );

    assert_eq!(first.model.get("id").unwrap().variable_type, VariableType::String);
    assert_eq!(first.model.get("flag").unwrap().variable_type, VariableType::Binary);
    assert_eq!(
        first.model.get("grade").unwrap().variable_type,
        VariableType::Categorical
    );
    assert_eq!(
        first.model.get("height").unwrap().variable_type,
        VariableType::Numeric
    );
}
