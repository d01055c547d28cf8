//! Tree item type for the sly-data and agent editors.
//!
//! A tree item is either a leaf holding a JSON value or an internal node
//! holding children, never both. In Rust that is the `TreeContent` enum; on
//! the wire it keeps the flat `{ value, children, hasValue }` shape the
//! editor components read.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::value::format_label;

/// JSON type tag shown next to a tree item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl ValueType {
    /// Type tag of a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tree item holds.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeContent {
    /// Leaf with a scalar (or opaque array) value.
    Value(Value),
    /// Internal node; the list may be empty.
    Children(Vec<TreeItem>),
}

/// One row of the JSON tree editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TreeItemWire", try_from = "TreeItemWire")]
pub struct TreeItem {
    pub id: String,
    /// Display form: `key: <json value>` for leaves, bare `key` otherwise.
    pub label: String,
    pub key: Option<String>,
    pub parent_id: Option<String>,
    pub is_key_value_pair: bool,
    pub value_type: ValueType,
    pub depth: u32,
    pub content: TreeContent,
}

impl TreeItem {
    /// A keyed leaf.
    pub fn leaf(
        id: String,
        key: &str,
        value: Value,
        parent_id: Option<&str>,
        depth: u32,
    ) -> Self {
        Self {
            id,
            label: format_label(key, Some(&value)),
            key: Some(key.to_string()),
            parent_id: parent_id.map(str::to_string),
            is_key_value_pair: true,
            value_type: ValueType::of(&value),
            depth,
            content: TreeContent::Value(value),
        }
    }

    /// A keyed internal node.
    pub fn branch(
        id: String,
        key: &str,
        children: Vec<TreeItem>,
        parent_id: Option<&str>,
        depth: u32,
    ) -> Self {
        Self {
            id,
            label: key.to_string(),
            key: Some(key.to_string()),
            parent_id: parent_id.map(str::to_string),
            is_key_value_pair: true,
            value_type: ValueType::Object,
            depth,
            content: TreeContent::Children(children),
        }
    }

    /// True for leaves.
    pub fn has_value(&self) -> bool {
        matches!(self.content, TreeContent::Value(_))
    }

    /// Value of a leaf.
    pub fn value(&self) -> Option<&Value> {
        match &self.content {
            TreeContent::Value(v) => Some(v),
            TreeContent::Children(_) => None,
        }
    }

    /// Children of an internal node.
    pub fn children(&self) -> Option<&[TreeItem]> {
        match &self.content {
            TreeContent::Children(c) => Some(c),
            TreeContent::Value(_) => None,
        }
    }

    /// Non-empty key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    /// Replace the content with a value and refresh type and label.
    pub fn set_value(&mut self, value: Value) {
        self.value_type = ValueType::of(&value);
        self.content = TreeContent::Value(value);
        self.refresh_label();
    }

    /// Turn a leaf into an empty internal node. No-op for internal nodes.
    pub fn make_branch(&mut self) {
        if self.has_value() {
            self.value_type = ValueType::Object;
            self.content = TreeContent::Children(Vec::new());
            self.refresh_label();
        }
    }

    /// Recompute the label from key and content.
    pub fn refresh_label(&mut self) {
        let Some(key) = self.key.as_deref() else {
            return;
        };
        self.label = format_label(key, self.value());
    }

    /// Number of items in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .map(|c| c.iter().map(TreeItem::subtree_len).sum())
            .unwrap_or(0)
    }

    /// True when `id` names this item or one below it.
    pub fn contains(&self, id: &str) -> bool {
        self.id == id
            || self
                .children()
                .is_some_and(|c| c.iter().any(|child| child.contains(id)))
    }
}

/// Flat wire shape of a tree item.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeItemWire {
    id: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(default)]
    is_key_value_pair: bool,
    #[serde(rename = "type")]
    value_type: ValueType,
    #[serde(default)]
    depth: u32,
    has_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<TreeItem>>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl From<TreeItem> for TreeItemWire {
    fn from(item: TreeItem) -> Self {
        let (value, children, has_value) = match item.content {
            TreeContent::Value(v) => (Some(v), None, true),
            TreeContent::Children(c) => (None, Some(c), false),
        };
        Self {
            id: item.id,
            label: item.label,
            key: item.key,
            value,
            parent_id: item.parent_id,
            is_key_value_pair: item.is_key_value_pair,
            value_type: item.value_type,
            depth: item.depth,
            has_value,
            children,
        }
    }
}

impl TryFrom<TreeItemWire> for TreeItem {
    type Error = String;

    fn try_from(wire: TreeItemWire) -> Result<Self, Self::Error> {
        let content = if wire.has_value {
            if wire.children.as_ref().is_some_and(|c| !c.is_empty()) {
                return Err(format!("tree item `{}` has both a value and children", wire.id));
            }
            TreeContent::Value(wire.value.unwrap_or(Value::Null))
        } else {
            if wire.value.as_ref().is_some_and(|v| !v.is_null()) {
                return Err(format!("tree item `{}` has children and a value", wire.id));
            }
            TreeContent::Children(wire.children.unwrap_or_default())
        };

        Ok(Self {
            id: wire.id,
            label: wire.label,
            key: wire.key,
            parent_id: wire.parent_id,
            is_key_value_pair: wire.is_key_value_pair,
            value_type: wire.value_type,
            depth: wire.depth,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_of() {
        assert_eq!(ValueType::of(&json!({})), ValueType::Object);
        assert_eq!(ValueType::of(&json!([1])), ValueType::Array);
        assert_eq!(ValueType::of(&json!("s")), ValueType::String);
        assert_eq!(ValueType::of(&json!(1.5)), ValueType::Number);
        assert_eq!(ValueType::of(&json!(false)), ValueType::Boolean);
        assert_eq!(ValueType::of(&Value::Null), ValueType::Null);
    }

    #[test]
    fn test_leaf_wire_shape() {
        let item = TreeItem::leaf("item-1".into(), "name", json!("Ada"), None, 0);
        let wire = serde_json::to_value(&item).unwrap();

        assert_eq!(
            wire,
            json!({
                "id": "item-1",
                "label": "name: \"Ada\"",
                "key": "name",
                "value": "Ada",
                "isKeyValuePair": true,
                "type": "string",
                "depth": 0,
                "hasValue": true,
            })
        );
    }

    #[test]
    fn test_null_leaf_keeps_value_key() {
        let item = TreeItem::leaf("item-1".into(), "x", Value::Null, Some("item-0"), 1);
        let wire = serde_json::to_value(&item).unwrap();
        assert_eq!(wire["value"], Value::Null);
        assert!(wire.as_object().unwrap().contains_key("value"));

        let back: TreeItem = serde_json::from_value(wire).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_branch_wire_shape() {
        let child = TreeItem::leaf("item-2".into(), "n", json!(1), Some("item-1"), 1);
        let item = TreeItem::branch("item-1".into(), "cfg", vec![child], None, 0);
        let wire = serde_json::to_value(&item).unwrap();

        assert_eq!(wire["hasValue"], false);
        assert_eq!(wire["type"], "object");
        assert_eq!(wire["label"], "cfg");
        assert!(wire.get("value").is_none());
        assert_eq!(wire["children"][0]["parentId"], "item-1");
    }

    #[test]
    fn test_wire_rejects_value_and_children() {
        let wire = json!({
            "id": "bad", "label": "bad", "type": "object", "hasValue": true,
            "value": 1,
            "children": [{ "id": "c", "label": "c", "type": "null", "hasValue": true, "value": null }],
        });
        assert!(serde_json::from_value::<TreeItem>(wire).is_err());
    }

    #[test]
    fn test_make_branch_and_set_value() {
        let mut item = TreeItem::leaf("item-1".into(), "k", json!(3), None, 0);
        item.make_branch();
        assert!(!item.has_value());
        assert_eq!(item.label, "k");
        assert_eq!(item.children().map(<[TreeItem]>::len), Some(0));

        item.set_value(json!(true));
        assert_eq!(item.value_type, ValueType::Boolean);
        assert_eq!(item.label, "k: true");
    }

    #[test]
    fn test_contains_and_subtree_len() {
        let grandchild = TreeItem::leaf("c".into(), "c", json!(1), Some("b"), 2);
        let child = TreeItem::branch("b".into(), "b", vec![grandchild], Some("a"), 1);
        let root = TreeItem::branch("a".into(), "a", vec![child], None, 0);

        assert!(root.contains("c"));
        assert!(!root.contains("z"));
        assert_eq!(root.subtree_len(), 3);
    }
}
