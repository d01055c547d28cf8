//! In-place editing of a JSON tree.
//!
//! `TreeEditor` owns the item list and the id source for one editing
//! session. Every mutation keeps the leaf/branch invariant:
//! adding under a leaf turns it into a branch, and removing the last child
//! of a branch turns it back into a leaf holding `""`.

use serde_json::Value;

use super::convert::{json_to_tree_data, tree_data_to_json};
use super::ids::{IdSource, SequentialIds};
use super::item::{TreeContent, TreeItem};
use super::validate::{export_json_text, import_json_text};
use super::value::{parse_edited_value, parse_label};
use crate::error::{EditError, ImportError};

/// Tree editor state for one session.
#[derive(Debug, Clone)]
pub struct TreeEditor<I: IdSource = SequentialIds> {
    items: Vec<TreeItem>,
    ids: I,
}

impl TreeEditor<SequentialIds> {
    pub fn new() -> Self {
        Self::with_ids(SequentialIds::new())
    }

    /// Take over items built elsewhere, continuing the id sequence past them.
    pub fn from_items(items: Vec<TreeItem>) -> Self {
        let mut ids = SequentialIds::new();
        ids.resume_after(&items);
        Self { items, ids }
    }
}

impl Default for TreeEditor<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IdSource> TreeEditor<I> {
    pub fn with_ids(ids: I) -> Self {
        Self {
            items: Vec::new(),
            ids,
        }
    }

    pub fn items(&self) -> &[TreeItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of items at every depth.
    pub fn len(&self) -> usize {
        self.items.iter().map(TreeItem::subtree_len).sum()
    }

    /// Replace the tree with the members of `json`. Ids keep counting from
    /// where the session left off.
    pub fn load_json(&mut self, json: &Value) {
        self.items = json_to_tree_data(json, &mut self.ids, None, 0);
        log::debug!("tree editor loaded {} items", self.len());
    }

    /// Validate and load JSON text. The tree is left untouched on error.
    pub fn import_text(&mut self, text: &str) -> Result<(), ImportError> {
        let value = import_json_text(text)?;
        self.load_json(&value);
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        tree_data_to_json(&self.items)
    }

    pub fn export_text(&self) -> Result<String, serde_json::Error> {
        export_json_text(&self.items)
    }

    /// Look an item up by id at any depth.
    pub fn find(&self, id: &str) -> Option<&TreeItem> {
        find_in(&self.items, id)
    }

    /// Append a keyed leaf at the top level. Returns the new id.
    pub fn add_root_item(&mut self, key: &str, value: Value) -> Result<String, EditError> {
        let key = clean_key(key)?;
        let id = self.ids.next_id();
        self.items
            .push(TreeItem::leaf(id.clone(), key, value, None, 0));
        Ok(id)
    }

    /// Append a keyed leaf under `parent_id`, turning a leaf parent into a
    /// branch. Returns the new id.
    pub fn add_child(
        &mut self,
        parent_id: &str,
        key: &str,
        value: Value,
    ) -> Result<String, EditError> {
        let key = clean_key(key)?;
        let parent = find_in_mut(&mut self.items, parent_id).ok_or_else(|| unknown(parent_id))?;
        let id = self.ids.next_id();

        parent.make_branch();
        let child = TreeItem::leaf(id.clone(), key, value, Some(parent_id), parent.depth + 1);
        if let TreeContent::Children(children) = &mut parent.content {
            children.push(child);
        }
        Ok(id)
    }

    /// Remove an item and its subtree, returning it.
    pub fn delete_item(&mut self, id: &str) -> Result<TreeItem, EditError> {
        detach_in(&mut self.items, id).ok_or_else(|| unknown(id))
    }

    /// Change an item's key and refresh its label.
    pub fn rename_key(&mut self, id: &str, new_key: &str) -> Result<(), EditError> {
        let key = clean_key(new_key)?;
        let item = self.keyed_item_mut(id)?;
        item.key = Some(key.to_string());
        item.refresh_label();
        Ok(())
    }

    /// Set a leaf's value from user-typed text.
    pub fn edit_value(&mut self, id: &str, text: &str) -> Result<(), EditError> {
        let item = self.keyed_item_mut(id)?;
        if !item.has_value() {
            return Err(EditError::HasChildren { id: id.to_string() });
        }
        item.set_value(parse_edited_value(text));
        Ok(())
    }

    /// Apply a whole edited `key: value` label. A label without a colon only
    /// renames.
    pub fn edit_label(&mut self, id: &str, label: &str) -> Result<(), EditError> {
        let parsed = parse_label(label);
        let key = clean_key(&parsed.key)?;
        let item = self.keyed_item_mut(id)?;
        if parsed.value.is_some() && !item.has_value() {
            return Err(EditError::HasChildren { id: id.to_string() });
        }

        item.key = Some(key.to_string());
        match parsed.value {
            Some(value) => item.set_value(value),
            None => item.refresh_label(),
        }
        Ok(())
    }

    /// Reparent an item. `None` moves it to the top level. The item goes to
    /// the end of its new sibling list; depths and parent ids below it are
    /// recomputed.
    pub fn move_item(&mut self, id: &str, new_parent: Option<&str>) -> Result<(), EditError> {
        let item = self.find(id).ok_or_else(|| unknown(id))?;
        if let Some(target) = new_parent {
            if target == id {
                return Err(EditError::MoveIntoSelf { id: id.to_string() });
            }
            if item.contains(target) {
                return Err(EditError::MoveIntoDescendant {
                    id: id.to_string(),
                    target: target.to_string(),
                });
            }
            if self.find(target).is_none() {
                return Err(unknown(target));
            }
        }

        let mut moved = detach_in(&mut self.items, id).ok_or_else(|| unknown(id))?;
        match new_parent {
            None => {
                reparent(&mut moved, None, 0);
                self.items.push(moved);
            }
            Some(target) => {
                // Detaching may have turned the target back into a leaf.
                let parent = find_in_mut(&mut self.items, target).ok_or_else(|| unknown(target))?;
                parent.make_branch();
                reparent(&mut moved, Some(target), parent.depth + 1);
                if let TreeContent::Children(children) = &mut parent.content {
                    children.push(moved);
                }
            }
        }
        Ok(())
    }

    fn keyed_item_mut(&mut self, id: &str) -> Result<&mut TreeItem, EditError> {
        let item = find_in_mut(&mut self.items, id).ok_or_else(|| unknown(id))?;
        if !item.is_key_value_pair {
            return Err(EditError::NotAKeyValuePair { id: id.to_string() });
        }
        Ok(item)
    }
}

fn unknown(id: &str) -> EditError {
    EditError::UnknownItem { id: id.to_string() }
}

fn clean_key(key: &str) -> Result<&str, EditError> {
    let key = key.trim();
    if key.is_empty() {
        Err(EditError::EmptyKey)
    } else {
        Ok(key)
    }
}

fn find_in<'a>(items: &'a [TreeItem], id: &str) -> Option<&'a TreeItem> {
    items.iter().find_map(|item| {
        if item.id == id {
            Some(item)
        } else {
            item.children().and_then(|children| find_in(children, id))
        }
    })
}

fn find_in_mut<'a>(items: &'a mut [TreeItem], id: &str) -> Option<&'a mut TreeItem> {
    for item in items.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let TreeContent::Children(children) = &mut item.content {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Remove `id` from wherever it sits. A parent left without children
/// reverts to an empty-string leaf.
fn detach_in(items: &mut Vec<TreeItem>, id: &str) -> Option<TreeItem> {
    if let Some(pos) = items.iter().position(|item| item.id == id) {
        return Some(items.remove(pos));
    }
    for item in items.iter_mut() {
        if let TreeContent::Children(children) = &mut item.content {
            if let Some(removed) = detach_in(children, id) {
                if children.is_empty() {
                    item.set_value(Value::String(String::new()));
                }
                return Some(removed);
            }
        }
    }
    None
}

fn reparent(item: &mut TreeItem, parent_id: Option<&str>, depth: u32) {
    item.parent_id = parent_id.map(str::to_string);
    item.depth = depth;
    if let TreeContent::Children(children) = &mut item.content {
        for child in children.iter_mut() {
            reparent(child, Some(&item.id), depth + 1);
        }
    }
}
