//! Shape classification and text rendering of raw JSON values

use serde_json::{Map, Value};

/// Shape of a raw JSON value as seen by the structure analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonShape<'a> {
    Array(&'a [Value]),
    Object(&'a Map<String, Value>),
    Scalar(&'a Value),
    Null,
}

impl<'a> JsonShape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => JsonShape::Array(items),
            Value::Object(map) => JsonShape::Object(map),
            Value::Null => JsonShape::Null,
            scalar => JsonShape::Scalar(scalar),
        }
    }
}

/// Default textual form of a value.
///
/// Strings are rendered without quotes, integral floats without a trailing
/// `.0`, other numbers and booleans in their JSON spelling, and nested
/// objects/arrays as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_of() {
        assert!(matches!(JsonShape::of(&json!([1, 2])), JsonShape::Array(items) if items.len() == 2));
        assert!(matches!(JsonShape::of(&json!({"a": 1})), JsonShape::Object(_)));
        assert!(matches!(JsonShape::of(&json!("x")), JsonShape::Scalar(_)));
        assert!(matches!(JsonShape::of(&json!(false)), JsonShape::Scalar(_)));
        assert_eq!(JsonShape::of(&Value::Null), JsonShape::Null);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("plain")), "plain");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!(1.0)), "1");
        assert_eq!(display_value(&json!(-3.0)), "-3");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&Value::Null), "null");
        assert_eq!(display_value(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
    }
}
