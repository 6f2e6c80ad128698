//! Attribute decoding.
//!
//! Existing log fixtures rely on the exact splitting rule below, so it is
//! intentionally permissive:
//!
//! - each entry is split on its **first** `:` (later colons stay in the value),
//! - entries with no `:` are dropped,
//! - key and value are trimmed of surrounding whitespace,
//! - a repeated key keeps the **last** value.

use std::collections::HashMap;

/// Key/value view of a span's attributes.
pub type AttributeMap = HashMap<String, String>;

/// Decode raw `"key:value"` strings into an [`AttributeMap`].
pub fn decode<S: AsRef<str>>(raw: &[S]) -> AttributeMap {
    let mut map = AttributeMap::with_capacity(raw.len());
    for entry in raw {
        let entry: &str = entry.as_ref();
        if let Some((key, value)) = entry.split_once(':') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    debug_assert!(map.len() <= raw.len());
    map
}

/// Whether `map` carries at least one of `keys`.
pub fn has_any<S: AsRef<str>>(map: &AttributeMap, keys: &[S]) -> bool {
    keys.iter().any(|k| {
        let key: &str = k.as_ref();
        map.contains_key(key)
    })
}

/// First non-empty value among `keys`, in priority order.
///
/// An empty value is treated the same as a missing key.
pub fn first_value<'a, S: AsRef<str>>(map: &'a AttributeMap, keys: &[S]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| {
            let key: &str = k.as_ref();
            map.get(key)
        })
        .map(String::as_str)
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_colon_only() {
        let map = decode(&["kc.plan:SELECT a::int FROM t", "url:http://x:80"]);
        assert_eq!(map["kc.plan"], "SELECT a::int FROM t");
        assert_eq!(map["url"], "http://x:80");
    }

    #[test]
    fn drops_entries_without_colon() {
        let map = decode(&["orphan", "kc.rows:3", ""]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["kc.rows"], "3");
    }

    #[test]
    fn trims_keys_and_values() {
        let map = decode(&["  merkle_root :  abc123  "]);
        assert_eq!(map["merkle_root"], "abc123");
    }

    #[test]
    fn last_write_wins() {
        let map = decode(&["result:1", "result:2", "result: 3"]);
        assert_eq!(map["result"], "3");
    }

    #[test]
    fn empty_key_and_value_are_kept() {
        let map = decode(&[":value", "key:"]);
        assert_eq!(map[""], "value");
        assert_eq!(map["key"], "");
    }

    #[test]
    fn first_value_respects_priority_and_skips_empty() {
        let map = decode(&["count:7", "hash:ff", "result:"]);
        assert_eq!(first_value(&map, &["result", "hash", "count"]), Some("ff"));
        assert_eq!(first_value(&map, &["missing"]), None);
    }

    #[test]
    fn has_any_matches_single_key() {
        let map = decode(&["signature:sig"]);
        assert!(has_any(&map, &["merkle_root", "signature"]));
        assert!(!has_any(&map, &["receipt_hash"]));
    }
}
