//! Dotted-path access into nested property maps.
//!
//! `meta.context.name` addresses `{"meta": {"context": {"name": ..}}}`.
//! Every segment must be non-empty, and a segment that already holds a scalar
//! is never turned into a map.

use analytics_client::{PropertyMap, Value};

pub const SEPARATOR: char = '.';

/// Look up `path` in `root`. Absence, including hitting a scalar before the
/// path is exhausted, is `None`.
pub fn get<'a>(root: &'a PropertyMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(SEPARATOR);
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

/// Bind `value` at `path`, creating intermediate maps as needed.
///
/// Returns `false` if a segment is empty or an intermediate segment is bound
/// to a non-map value. A failed call leaves `root` untouched.
pub fn set(root: &mut PropertyMap, path: &str, value: Value) -> bool {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    set_segments(root, &segments, value)
}

fn set_segments(map: &mut PropertyMap, segments: &[&str], value: Value) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };
    if head.is_empty() {
        return false;
    }
    if rest.is_empty() {
        map.insert(head.to_string(), value);
        return true;
    }
    match map.get_mut(*head) {
        Some(Value::Map(child)) => set_segments(child, rest, value),
        Some(_) => false,
        None => {
            // only attached once everything below it succeeded
            let mut child = PropertyMap::new();
            if set_segments(&mut child, rest, value) {
                map.insert(head.to_string(), Value::Map(child));
                true
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_client::props_from_json;
    use serde_json::json;

    fn props(v: serde_json::Value) -> PropertyMap {
        props_from_json(v).unwrap()
    }

    #[test]
    fn test_set_flat_key() {
        let mut event = PropertyMap::new();
        assert!(set(&mut event, "key1", Value::from("val1")));
        assert_eq!(event, props(json!({"key1": "val1"})));
    }

    #[test]
    fn test_set_refuses_to_clobber_scalar() {
        let mut event = props(json!({"key1": "val1"}));
        let before = event.clone();

        assert!(!set(&mut event, "key1.key2", Value::from("val2")));
        assert_eq!(event, before);

        assert!(!set(&mut event, "key1.key2.key3", Value::from("val2")));
        assert_eq!(event, before);
    }

    #[test]
    fn test_set_creates_and_extends_nested_maps() {
        let mut event = PropertyMap::new();
        assert!(set(&mut event, "key2.key3", Value::from("val3")));
        assert!(set(&mut event, "key2.key4", Value::from("val4")));
        assert_eq!(
            event,
            props(json!({"key2": {"key3": "val3", "key4": "val4"}}))
        );
    }

    #[test]
    fn test_set_flat_and_deep_keys_coexist() {
        let mut event = PropertyMap::new();
        assert!(set(&mut event, "eventKey1", Value::from("val1")));
        assert!(set(&mut event, "meta.context.name", Value::from("n")));
        assert_eq!(
            event,
            props(json!({"eventKey1": "val1", "meta": {"context": {"name": "n"}}}))
        );
    }

    #[test]
    fn test_set_empty_segments_fail_without_mutation() {
        let mut event = props(json!({"a": {"b": "x"}}));
        let before = event.clone();
        for path in ["", ".", "a.", ".a", "a..b", "new..leaf", "new.deeper."] {
            assert!(!set(&mut event, path, Value::from(1)), "path {path:?}");
            assert_eq!(event, before, "path {path:?}");
        }
    }

    #[test]
    fn test_set_final_segment_overwrites_anything() {
        let mut event = props(json!({"a": {"b": "x"}, "c": "scalar"}));
        assert!(set(&mut event, "a", Value::from(3)));
        assert!(set(&mut event, "c", Value::from(true)));
        assert_eq!(event, props(json!({"a": 3, "c": true})));
    }

    #[test]
    fn test_get_walks_nested_maps() {
        let root = props(json!({"parent": {"child": 3}, "flat": "v"}));
        assert_eq!(get(&root, "flat"), Some(&Value::from("v")));
        assert_eq!(get(&root, "parent.child"), Some(&Value::from(3)));
        assert_eq!(
            get(&root, "parent"),
            Some(&Value::Map(props(json!({"child": 3}))))
        );
    }

    #[test]
    fn test_get_absent_paths() {
        let root = props(json!({"parent": 3, "": 4}));
        assert_eq!(get(&root, "missing"), None);
        assert_eq!(get(&root, "parent.child"), None);
        assert_eq!(get(&root, "parent.child.grandchild"), None);
        assert_eq!(get(&PropertyMap::new(), "a.b"), None);
    }
}
