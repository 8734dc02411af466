//! Typed access to loosely structured JSON documents.
//!
//! The Ushahidi feed is inconsistent about types: ids, flags and
//! coordinates arrive as JSON numbers on some servers and as strings on
//! others, and optional keys are frequently absent. Every getter here
//! returns an `Option`, so callers decide per field whether a miss is an
//! error or a default.

use serde_json::Value;

/// Typed getters over a JSON object.
pub trait Document {
    /// Raw value stored under `key`, if this is an object that has it.
    fn field(&self, key: &str) -> Option<&Value>;

    /// String value under `key`. Numbers are not coerced.
    fn text(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Integer under `key`, accepting numeric strings.
    fn int(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(as_int)
    }

    /// Floating point value under `key`, accepting numeric strings.
    fn float(&self, key: &str) -> Option<f64> {
        self.field(key).and_then(as_float)
    }

    /// Nested object under `key`.
    fn object(&self, key: &str) -> Option<&Value> {
        self.field(key).filter(|v| v.is_object())
    }

    /// Array under `key`.
    fn list(&self, key: &str) -> Option<&[Value]> {
        self.field(key).and_then(Value::as_array).map(Vec::as_slice)
    }
}

impl Document for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

/// Coerce a JSON value to an integer.
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a float.
pub fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_accepts_numbers_and_strings() {
        let doc = json!({"a": 7, "b": " 42 ", "c": "x", "d": 1.5});
        assert_eq!(doc.int("a"), Some(7));
        assert_eq!(doc.int("b"), Some(42));
        assert_eq!(doc.int("c"), None);
        assert_eq!(doc.int("d"), None);
        assert_eq!(doc.int("missing"), None);
    }

    #[test]
    fn test_float_accepts_numbers_and_strings() {
        let doc = json!({"lat": "41.7436", "lon": -92.7247, "bad": true});
        assert_eq!(doc.float("lat"), Some(41.7436));
        assert_eq!(doc.float("lon"), Some(-92.7247));
        assert_eq!(doc.float("bad"), None);
    }

    #[test]
    fn test_text_does_not_coerce_numbers() {
        let doc = json!({"title": "Flood", "n": 3});
        assert_eq!(doc.text("title"), Some("Flood"));
        assert_eq!(doc.text("n"), None);
    }

    #[test]
    fn test_object_and_list() {
        let doc = json!({"error": {"code": 0}, "items": [1, 2], "scalar": 5});
        assert!(doc.object("error").is_some());
        assert!(doc.object("scalar").is_none());
        assert_eq!(doc.list("items").map(<[Value]>::len), Some(2));
        assert!(doc.list("error").is_none());
    }

    #[test]
    fn test_non_object_has_no_fields() {
        let doc = json!([1, 2, 3]);
        assert!(doc.field("0").is_none());
    }
}
