//! `application/x-www-form-urlencoded` decoding into JSON objects.
//!
//! Used for both query strings and form bodies. A key that appears more than
//! once collects its values into an array, in order of appearance.

use serde_json::{Map, Value};

/// Decodes urlencoded bytes into a JSON object of strings.
///
/// # Example
///
/// ```
/// use tessera_core::urlencoded::decode;
/// use serde_json::json;
///
/// let map = decode(b"a=1&b=two+words&a=2").unwrap();
/// assert_eq!(serde_json::Value::Object(map), json!({"a": ["1", "2"], "b": "two words"}));
/// ```
pub fn decode(input: &[u8]) -> Result<Map<String, Value>, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)?;
    Ok(collect_pairs(pairs))
}

/// Decodes a query string (without the leading `?`).
pub fn decode_str(input: &str) -> Result<Map<String, Value>, serde_urlencoded::de::Error> {
    decode(input.as_bytes())
}

fn collect_pairs(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    map
}
