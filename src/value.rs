//! Raw-value coercion helpers shared by the resolver, classifier,
//! statistics and filter engines.

use serde_json::Value;

/// Coerce a raw record value to a number, if possible.
///
/// Numbers pass through, numeric strings are parsed, booleans map to 0/1.
/// Everything else (including whitespace-only strings) fails coercion.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Stringify a raw value the way categorical keys are compared.
///
/// Integral numbers print without a fractional part so that `2` and `2.0`
/// land in the same frequency bucket and match the same code key.
#[must_use]
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9e15 => {
                        format!("{}", f as i64)
                    }
                    _ => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
