//! Conversion between JSON objects and editor tree items.
//!
//! Objects become internal nodes, everything else (arrays included) becomes a
//! leaf. Going back, only keyed key/value items contribute, so
//! `tree_data_to_json(&json_to_tree_data(x, ..))` rebuilds `x` for any object
//! `x`, with key order kept by serde_json's `preserve_order`.

use serde_json::{Map, Value};

use super::ids::IdSource;
use super::item::{TreeContent, TreeItem};

/// Convert the members of a JSON object into tree items.
///
/// `parent_id` and `depth` describe where the returned items hang; the root
/// call passes `None` and `0`. Ids are drawn from `ids` in pre-order, parent
/// before children. A non-object input yields no items.
pub fn json_to_tree_data<I: IdSource + ?Sized>(
    json: &Value,
    ids: &mut I,
    parent_id: Option<&str>,
    depth: u32,
) -> Vec<TreeItem> {
    let Some(object) = json.as_object() else {
        log::warn!("json_to_tree_data: expected an object, got {json}");
        return Vec::new();
    };
    object_to_items(object, ids, parent_id, depth)
}

fn object_to_items<I: IdSource + ?Sized>(
    object: &Map<String, Value>,
    ids: &mut I,
    parent_id: Option<&str>,
    depth: u32,
) -> Vec<TreeItem> {
    object
        .iter()
        .map(|(key, value)| {
            let id = ids.next_id();
            match value {
                Value::Object(nested) => {
                    let children = object_to_items(nested, ids, Some(&id), depth + 1);
                    TreeItem::branch(id, key, children, parent_id, depth)
                }
                other => TreeItem::leaf(id, key, other.clone(), parent_id, depth),
            }
        })
        .collect()
}

/// Convert tree items back into a JSON object.
///
/// Items that are not keyed key/value pairs are skipped.
pub fn tree_data_to_json(items: &[TreeItem]) -> Value {
    Value::Object(items_to_object(items))
}

fn items_to_object(items: &[TreeItem]) -> Map<String, Value> {
    let mut object = Map::new();
    for item in items.iter().filter(|item| item.is_key_value_pair) {
        let Some(key) = item.key() else {
            continue;
        };
        let value = match &item.content {
            TreeContent::Children(children) => Value::Object(items_to_object(children)),
            TreeContent::Value(value) => value.clone(),
        };
        object.insert(key.to_string(), value);
    }
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SequentialIds, ValueType};
    use serde_json::json;
    use std::collections::HashSet;

    fn all_ids(items: &[TreeItem], out: &mut Vec<String>) {
        for item in items {
            out.push(item.id.clone());
            if let Some(children) = item.children() {
                all_ids(children, out);
            }
        }
    }

    #[test]
    fn test_documented_example() {
        let json = json!({ "a": 1, "b": { "c": "x" } });
        let items = json_to_tree_data(&json, &mut SequentialIds::new(), None, 0);

        assert_eq!(items.len(), 2);
        let a = &items[0];
        assert_eq!(a.label, "a: 1");
        assert!(a.has_value());
        assert_eq!(a.value_type, ValueType::Number);
        assert_eq!(a.depth, 0);
        assert_eq!(a.parent_id, None);

        let b = &items[1];
        assert_eq!(b.label, "b");
        assert!(!b.has_value());
        assert_eq!(b.value_type, ValueType::Object);

        let c = &b.children().unwrap()[0];
        assert_eq!(c.label, "c: \"x\"");
        assert_eq!(c.depth, 1);
        assert_eq!(c.parent_id.as_deref(), Some(b.id.as_str()));

        assert_eq!(tree_data_to_json(&items), json);
    }

    #[test]
    fn test_round_trip_nested() {
        let json = json!({
            "name": "agent",
            "count": 3,
            "ratio": 0.5,
            "on": false,
            "none": null,
            "cfg": { "deep": { "deeper": { "x": "y" } }, "empty": {} },
        });
        let items = json_to_tree_data(&json, &mut SequentialIds::new(), None, 0);
        assert_eq!(tree_data_to_json(&items), json);
    }

    #[test]
    fn test_round_trip_keeps_key_order() {
        let json = json!({ "z": 1, "a": 2, "m": 3 });
        let items = json_to_tree_data(&json, &mut SequentialIds::new(), None, 0);
        let back = tree_data_to_json(&items);
        let keys: Vec<_> = back.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_arrays_are_opaque_leaves() {
        let json = json!({ "list": [1, { "a": 2 }] });
        let items = json_to_tree_data(&json, &mut SequentialIds::new(), None, 0);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value_type, ValueType::Array);
        assert_eq!(items[0].label, "list: [1,{\"a\":2}]");
        assert_eq!(tree_data_to_json(&items), json);
    }

    #[test]
    fn test_empty_object_is_empty_branch() {
        let items = json_to_tree_data(&json!({ "e": {} }), &mut SequentialIds::new(), None, 0);
        assert_eq!(items[0].children().map(<[TreeItem]>::len), Some(0));
        assert_eq!(tree_data_to_json(&items), json!({ "e": {} }));
    }

    #[test]
    fn test_ids_unique_per_key() {
        let json = json!({ "a": { "b": { "c": 1, "d": 2 }, "e": 3 }, "f": 4 });
        let items = json_to_tree_data(&json, &mut SequentialIds::new(), None, 0);

        let mut ids = Vec::new();
        all_ids(&items, &mut ids);
        assert_eq!(ids.len(), 6);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 6);
        assert_eq!(ids[0], "item-1");
    }

    #[test]
    fn test_shared_counter_across_calls() {
        let mut ids = SequentialIds::new();
        let first = json_to_tree_data(&json!({ "a": 1 }), &mut ids, None, 0);
        let second = json_to_tree_data(&json!({ "b": 2 }), &mut ids, None, 0);
        assert_ne!(first[0].id, second[0].id);
    }

    #[test]
    fn test_parent_and_depth_passed_through() {
        let items = json_to_tree_data(&json!({ "k": 1 }), &mut SequentialIds::new(), Some("p"), 4);
        assert_eq!(items[0].parent_id.as_deref(), Some("p"));
        assert_eq!(items[0].depth, 4);
    }

    #[test]
    fn test_non_object_yields_nothing() {
        let mut ids = SequentialIds::new();
        assert!(json_to_tree_data(&json!([1, 2]), &mut ids, None, 0).is_empty());
        assert!(json_to_tree_data(&json!("s"), &mut ids, None, 0).is_empty());
        assert!(json_to_tree_data(&Value::Null, &mut ids, None, 0).is_empty());
        assert_eq!(ids.peek(), 1);
    }

    #[test]
    fn test_unkeyed_items_skipped() {
        let mut keyed = TreeItem::leaf("1".into(), "a", json!(1), None, 0);
        let mut loose = TreeItem::leaf("2".into(), "b", json!(2), None, 0);
        loose.is_key_value_pair = false;
        let mut blank = TreeItem::leaf("3".into(), "", json!(3), None, 0);
        blank.key = Some(String::new());
        keyed.label = "whatever".into();

        assert_eq!(tree_data_to_json(&[keyed, loose, blank]), json!({ "a": 1 }));
    }
}
