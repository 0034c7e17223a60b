//! Whitespace normalisation for extracted input.

use serde_json::Value;

/// Characters stripped from both ends of every string value.
pub const TRIM_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Trims [`TRIM_CHARS`] from both ends of `input`.
#[must_use]
pub fn trim_str(input: &str) -> &str {
    input.trim_matches(&TRIM_CHARS[..])
}

/// Recursively trims every string inside `value`.
///
/// Strings nested in arrays and objects are trimmed; object keys, numbers,
/// booleans and nulls are left as they are.
///
/// # Example
///
/// ```
/// use tessera_extract::trim_value;
/// use serde_json::json;
///
/// let trimmed = trim_value(json!({"name": "  Ada ", "tags": [" a", 3]}));
/// assert_eq!(trimmed, json!({"name": "Ada", "tags": ["a", 3]}));
/// ```
#[must_use]
pub fn trim_value(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = trim_str(&s);
            if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(trim_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, trim_value(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_trim_str_charset() {
        assert_eq!(trim_str(" \t\n\r\0\x0Bvalue\x0B\0\r\n\t "), "value");
        assert_eq!(trim_str("in  side"), "in  side");
        // Non-breaking space is not part of the set.
        assert_eq!(trim_str("\u{a0}x"), "\u{a0}x");
    }

    #[test]
    fn test_trim_nested() {
        let value = json!({
            "user": {"email": " a@b.c\n", "roles": [" admin ", {"x": "\ty"}]},
            "count": 4,
            "active": true,
            "missing": null
        });
        assert_eq!(
            trim_value(value),
            json!({
                "user": {"email": "a@b.c", "roles": ["admin", {"x": "y"}]},
                "count": 4,
                "active": true,
                "missing": null
            })
        );
    }

    #[test]
    fn test_keys_are_not_trimmed() {
        let trimmed = trim_value(json!({" key ": " v "}));
        assert_eq!(trimmed, json!({" key ": "v"}));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[ \t\n\r\x0Ba-z]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z ]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_trim_is_idempotent(value in arb_json()) {
            let once = trim_value(value);
            let twice = trim_value(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_trimmed_strings_have_no_outer_whitespace(s in "[ \t\n\r\x0Ba-z]{0,16}") {
            let trimmed = trim_str(&s);
            prop_assert!(!trimmed.starts_with(&TRIM_CHARS[..]));
            prop_assert!(!trimmed.ends_with(&TRIM_CHARS[..]));
        }
    }
}
