//! JSON tree model for the sly-data and agent editors.
//!
//! - `item`: the `TreeItem` record and its wire shape
//! - `ids`: caller-owned id sources
//! - `convert`: JSON object <-> tree items
//! - `value`: typing of edited values and `key: value` labels
//! - `validate`: import checks and pretty export
//! - `editor`: a session that owns items plus ids and applies edits

mod convert;
mod editor;
mod ids;
mod item;
mod validate;
mod value;

pub use convert::{json_to_tree_data, tree_data_to_json};
pub use editor::TreeEditor;
pub use ids::{IdSource, SequentialIds};
pub use item::{TreeContent, TreeItem, ValueType};
pub use validate::{MAX_IMPORT_DEPTH, export_json_text, import_json_text, validate_import};
pub use value::{ParsedLabel, format_label, parse_edited_value, parse_label};
