//! Resolution of JSON Schema (Draft 2020-12 style) documents.
//!
//! Real-world schema exports spell the same metadata many ways: nullable
//! types as `["number","null"]` arrays or `oneOf` variants, code labels as
//! vendor extensions, `const`/`title` variants, or `enum` companions. Each
//! extraction helper tries those encodings in a fixed priority order.

use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::schema::{CodeMap, GroupLabels, SchemaEntry, SchemaModel, VariableType};
use crate::value::{coerce_number, value_key};

type JsonMap = Map<String, Value>;

/// Resolve a JSON Schema document into a model and its group labels.
///
/// Every property yields an entry; an unrecognizable property falls back
/// to an ungrouped numeric variable rather than failing the document.
pub(super) fn parse(root: &JsonMap, config: &EngineConfig) -> (SchemaModel, GroupLabels) {
    let empty = JsonMap::new();
    let props = root
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut model = SchemaModel::new();
    for (key, prop) in props {
        let prop = prop.as_object().unwrap_or(&empty);
        model.insert(key.clone(), resolve_property(key, prop, config));
    }

    let label_map = root
        .get("x-groupLabels")
        .or_else(|| root.get("groupLabels"))
        .and_then(Value::as_object);
    let mut labels = GroupLabels::new();
    for group in model.groups_in_use() {
        let label = label_map
            .and_then(|map| map.get(&group))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map_or_else(|| GroupLabels::capitalize(&group), str::to_string);
        labels.insert(group, label);
    }

    (model, labels)
}

/// Resolve one schema property into a variable entry.
fn resolve_property(key: &str, prop: &JsonMap, config: &EngineConfig) -> SchemaEntry {
    let raw_type = infer_raw_type(prop);
    let explicit_type = str_field(prop, &["x-type", "x-variableType", "variableType"]);
    let codes = extract_codes(prop, config.max_enum_codes);
    let sentinel = extract_sentinel(prop);

    let group = str_field(prop, &["x-group", "x-category", "group", "category"])
        .unwrap_or("data")
        .to_string();
    let description = str_field(prop, &["description", "title"])
        .unwrap_or(key)
        .to_string();
    let unit = str_field(prop, &["x-unit", "unit"])
        .map(str::to_string)
        .or_else(|| trailing_parenthetical(&description));

    // Type priority: explicit tag, then code map shape, then the raw JSON
    // Schema type. Numeric is the safest default for unknown fields.
    let variable_type = match explicit_type {
        Some(tag) => VariableType::parse(tag),
        None => match &codes {
            Some(codes) => coded_type(codes, config),
            None => match raw_type {
                Some("number") => VariableType::Numeric,
                Some("integer") => VariableType::Integer,
                Some("boolean") => VariableType::Binary,
                Some("string") => VariableType::String,
                _ => VariableType::Numeric,
            },
        },
    };

    SchemaEntry {
        description,
        group,
        variable_type,
        unit,
        sentinel,
        codes,
    }
}

/// First of `keys` that holds a non-empty string.
fn str_field<'a>(prop: &'a JsonMap, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        prop.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    })
}

/// The `oneOf`/`anyOf` variant list, `oneOf` taking precedence.
fn variants(prop: &JsonMap) -> Option<&Vec<Value>> {
    prop.get("oneOf")
        .or_else(|| prop.get("anyOf"))
        .and_then(Value::as_array)
}

/// Resolve a `type` keyword that may be a string or a nullable array,
/// e.g. `"number"` or `["number", "null"]`.
fn resolve_json_type(t: &Value) -> Option<&str> {
    match t {
        Value::String(s) => Some(s),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find(|s| *s != "null"),
        _ => None,
    }
}

/// The underlying non-null raw type of a property, looking through
/// nullable arrays and `oneOf`/`anyOf` wrappers.
fn infer_raw_type(prop: &JsonMap) -> Option<&str> {
    if let Some(t) = prop.get("type").and_then(resolve_json_type) {
        return Some(t);
    }
    variants(prop)?.iter().find_map(|variant| {
        let t = variant.get("type").and_then(Value::as_str)?;
        (t != "null" && variant.get("const").is_none()).then_some(t)
    })
}

/// A variant's `title` or `description` as label text, stringified the
/// way code keys are.
fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(value_key(other)),
    }
}

/// Extract a code map from the encodings seen in the wild, in priority
/// order:
///
/// 1. explicit `x-codes` / `x-labels` / `codes` objects;
/// 2. `oneOf`/`anyOf` variants of `const` + `title`;
/// 3. `enum` with an `enumNames` or `enumDescriptions` companion;
/// 4. a bare `enum` of at most `max_enum_codes` values, each its own label.
fn extract_codes(prop: &JsonMap, max_enum_codes: usize) -> Option<CodeMap> {
    for key in ["x-codes", "x-labels", "codes"] {
        if let Some(object) = prop.get(key).and_then(Value::as_object) {
            return Some(
                object
                    .iter()
                    .map(|(code, label)| {
                        let label = label_text(label).unwrap_or_else(|| code.clone());
                        (code.clone(), label)
                    })
                    .collect(),
            );
        }
    }

    if let Some(variants) = variants(prop) {
        // A const-free numeric variant marks the numeric-with-sentinel
        // pattern: the const variants are sentinels, not codes.
        let has_numeric_branch = variants.iter().any(|v| {
            matches!(v.get("type").and_then(Value::as_str), Some("number" | "integer"))
                && v.get("const").is_none()
        });
        if has_numeric_branch {
            return None;
        }
        let mut map = CodeMap::new();
        for variant in variants {
            let Some(constant) = variant.get("const") else {
                continue;
            };
            let label = variant
                .get("title")
                .and_then(label_text)
                .or_else(|| variant.get("description").and_then(label_text));
            if let Some(label) = label {
                map.insert(value_key(constant), label);
            }
        }
        if !map.is_empty() {
            return Some(map);
        }
    }

    let values = prop.get("enum").and_then(Value::as_array)?;

    if let Some(names) = prop.get("enumNames").and_then(Value::as_array) {
        let mut map = CodeMap::new();
        for (i, value) in values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let code = value_key(value);
            let label = names
                .get(i)
                .and_then(label_text)
                .unwrap_or_else(|| code.clone());
            map.insert(code, label);
        }
        return Some(map);
    }

    if let Some(descriptions) = prop.get("enumDescriptions").and_then(Value::as_array) {
        // "VALUE: Label text." lines; null entries describe missingness,
        // not a code.
        let mut map = CodeMap::new();
        for line in descriptions.iter().filter_map(Value::as_str) {
            let Some((code, label)) = line.split_once(": ") else {
                continue;
            };
            let code = code.trim();
            if code.eq_ignore_ascii_case("null") {
                continue;
            }
            let label = label.strip_suffix('.').unwrap_or(label).trim();
            map.insert(code.to_string(), label.to_string());
        }
        if !map.is_empty() {
            return Some(map);
        }
    }

    if values.len() <= max_enum_codes {
        let mut map = CodeMap::new();
        for value in values {
            if value.is_null() {
                continue;
            }
            let code = value_key(value);
            map.insert(code.clone(), code);
        }
        return Some(map);
    }

    None
}

/// Binary or categorical, by the number of non-sentinel codes.
fn coded_type(codes: &CodeMap, config: &EngineConfig) -> VariableType {
    let non_sentinel = codes
        .iter()
        .filter(|(code, _)| {
            !matches!(code.trim().parse::<f64>(), Ok(n) if n == 999.0 || n == 9999.0)
        })
        .count();
    if non_sentinel <= config.infer_binary_max {
        VariableType::Binary
    } else {
        VariableType::Categorical
    }
}

/// Sentinel value: an explicit `x-sentinel`/`sentinel` field, else a
/// `const` variant titled "NA" or mentioning "not applicable".
fn extract_sentinel(prop: &JsonMap) -> Option<f64> {
    let explicit = prop.get("x-sentinel").or_else(|| prop.get("sentinel"));
    if let Some(value) = explicit
        && let Some(number) = coerce_number(value)
    {
        return Some(number);
    }
    variants(prop)?.iter().find_map(|variant| {
        let constant = variant.get("const")?;
        let marked = ["title", "description"].iter().any(|key| {
            match variant.get(*key).and_then(Value::as_str) {
                Some("NA") => true,
                Some(text) => text.to_lowercase().contains("not applicable"),
                None => false,
            }
        });
        if marked { coerce_number(constant) } else { None }
    })
}

/// Unit from a trailing description parenthetical, e.g.
/// "Physical activity (hours/week)." yields "hours/week". Multi-word
/// qualifiers like "(current smokers)" are not units.
fn trailing_parenthetical(description: &str) -> Option<String> {
    let mut rest = description.trim_end();
    if let Some(stripped) = rest.strip_suffix('.') {
        rest = stripped.trim_end();
    }
    let rest = rest.strip_suffix(')')?;
    let open = rest.rfind('(')?;
    let inner = &rest[open + 1..];
    if inner.is_empty() || inner.chars().any(char::is_whitespace) {
        return None;
    }
    Some(inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(prop: Value) -> SchemaEntry {
        let config = EngineConfig::default();
        resolve_property("var", prop.as_object().unwrap(), &config)
    }

    #[test]
    fn nullable_type_arrays_resolve_to_the_non_null_type() {
        let entry = resolve(json!({"type": ["null", "integer"]}));
        assert_eq!(entry.variable_type, VariableType::Integer);
        let entry = resolve(json!({"type": ["number", "null"]}));
        assert_eq!(entry.variable_type, VariableType::Numeric);
    }

    #[test]
    fn explicit_type_tag_wins_over_everything() {
        let entry = resolve(json!({
            "type": "integer",
            "x-type": "categorical",
            "x-codes": {"1": "One"}
        }));
        assert_eq!(entry.variable_type, VariableType::Categorical);
    }

    #[test]
    fn const_title_variants_become_codes() {
        let entry = resolve(json!({
            "oneOf": [
                {"const": 0, "title": "No"},
                {"const": 1, "title": "Yes"},
                {"const": null, "title": "Missing"}
            ]
        }));
        let codes = entry.codes.unwrap();
        assert_eq!(codes.get("0"), Some("No"));
        assert_eq!(codes.get("1"), Some("Yes"));
        assert_eq!(codes.len(), 3);
        assert_eq!(entry.variable_type, VariableType::Categorical);
    }

    #[test]
    fn numeric_branch_suppresses_variant_codes() {
        let entry = resolve(json!({
            "oneOf": [
                {"type": "number"},
                {"const": 999, "title": "NA (not applicable)"}
            ]
        }));
        assert!(entry.codes.is_none());
        assert_eq!(entry.sentinel, Some(999.0));
        assert_eq!(entry.variable_type, VariableType::Numeric);
    }

    #[test]
    fn enum_with_names_builds_a_labelled_map() {
        let entry = resolve(json!({
            "type": ["integer", "null"],
            "enum": [0, 1, 2, null],
            "enumNames": ["Never", "Former", "Current"]
        }));
        let codes = entry.codes.unwrap();
        assert_eq!(codes.get("0"), Some("Never"));
        assert_eq!(codes.get("2"), Some("Current"));
        assert!(codes.get("null").is_none());
        assert_eq!(entry.variable_type, VariableType::Categorical);
    }

    #[test]
    fn enum_descriptions_parse_value_label_lines() {
        let entry = resolve(json!({
            "enum": [0, 1, null],
            "enumDescriptions": ["0: Never smoked.", "1: Current smoker.", "null: Missing."]
        }));
        let codes = entry.codes.unwrap();
        assert_eq!(codes.get("0"), Some("Never smoked"));
        assert_eq!(codes.get("1"), Some("Current smoker"));
        assert_eq!(codes.len(), 2);
        assert_eq!(entry.variable_type, VariableType::Binary);
    }

    #[test]
    fn bare_enum_uses_values_as_labels_up_to_the_cap() {
        let entry = resolve(json!({"enum": [1, 2, 3]}));
        let codes = entry.codes.unwrap();
        assert_eq!(codes.get("2"), Some("2"));

        let too_many: Vec<i64> = (0..21).collect();
        let entry = resolve(json!({"enum": too_many}));
        assert!(entry.codes.is_none());
    }

    #[test]
    fn sentinel_codes_do_not_count_toward_binary() {
        let entry = resolve(json!({
            "x-codes": {"0": "No", "1": "Yes", "999": "Not known"}
        }));
        assert_eq!(entry.variable_type, VariableType::Binary);
        let entry = resolve(json!({
            "x-codes": {"0": "No", "1": "Yes", "2": "Maybe"}
        }));
        assert_eq!(entry.variable_type, VariableType::Categorical);
    }

    #[test]
    fn units_come_from_fields_or_description_parentheticals() {
        let entry = resolve(json!({
            "description": "Body mass index (kg/m2).",
            "type": "number"
        }));
        assert_eq!(entry.unit.as_deref(), Some("kg/m2"));

        let entry = resolve(json!({
            "description": "Cigarettes per day (current smokers)",
            "type": "number"
        }));
        assert_eq!(entry.unit, None);

        let entry = resolve(json!({
            "description": "Weight (lbs)",
            "x-unit": "kg",
            "type": "number"
        }));
        assert_eq!(entry.unit.as_deref(), Some("kg"));
    }

    #[test]
    fn descriptions_fall_back_to_title_then_key() {
        let entry = resolve(json!({"title": "Parity"}));
        assert_eq!(entry.description, "Parity");
        let entry = resolve(json!({}));
        assert_eq!(entry.description, "var");
        assert_eq!(entry.group, "data");
        assert_eq!(entry.variable_type, VariableType::Numeric);
    }
}
