//! nsflow - WASM Module
//!
//! Layout and editing core for the nsflow agent-network UI. It is compiled
//! to WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: node/edge model, network builders, and the `NetworkEngine`
//!   holding the displayed network in petgraph's StableGraph
//! - `layout`: hierarchical-radial and layered layouts
//! - `tree`: JSON <-> tree item conversion and the tree editor
//! - `error`: error types shared by all of the above

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod tree;

use graph::builder::{build_from_connectivity, build_from_definition};
use graph::{AgentNetwork, ConnectivityResponse, NetworkEngine, NetworkState, Position};
use layout::{LayeredConfig, LayeredLayout, RadialConfig, RadialLayout};
use tree::{TreeEditor, TreeItem};

/// Initialize logging and the panic hook.
#[wasm_bindgen(start)]
pub fn init() {
    let _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
    log::info!("nsflow-wasm: initialized");
}

// =========================================================================
// JS conversion helpers
// =========================================================================

/// Log `err` and wrap it as a JS `Error`.
fn js_error(context: &str, err: impl Display) -> JsValue {
    let message = err.to_string();
    log::error!("{context}: {message}");
    js_sys::Error::new(&message).into()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error("serialize", e))
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| js_error(what, e))
}

/// Read an options object; `undefined` or `null` means all defaults.
fn options<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        from_js(value, "options")
    }
}

// =========================================================================
// Layout
// =========================================================================

/// Center of the browser viewport, for callers that want the radial layout
/// centered on screen. Falls back to the origin outside a browser.
#[wasm_bindgen(js_name = viewportCenter)]
pub fn viewport_center() -> Result<JsValue, JsValue> {
    let center = web_sys::window()
        .and_then(|window| {
            let width = window.inner_width().ok()?.as_f64()?;
            let height = window.inner_height().ok()?.as_f64()?;
            Some(Position::new(width / 2.0, height / 2.0))
        })
        .unwrap_or_default();
    to_js(&center)
}

/// Place a `{ nodes, edges }` network on concentric rings around its root.
///
/// `options` is a partial `RadialConfig`. Rejects malformed input, invalid
/// options, and networks without a root.
#[wasm_bindgen(js_name = hierarchicalRadialLayout)]
pub fn hierarchical_radial_layout(network: JsValue, options_value: JsValue) -> Result<JsValue, JsValue> {
    let doc: Value = from_js(network, "network")?;
    let config: RadialConfig = options(options_value)?;
    let result = RadialLayout::new(config)
        .compute_value(&doc)
        .map_err(|e| js_error("hierarchicalRadialLayout", e))?;
    to_js(&result)
}

/// Arrange a network in depth rows, one block per connected component.
#[wasm_bindgen(js_name = layeredLayout)]
pub fn layered_layout(network: JsValue, options_value: JsValue) -> Result<JsValue, JsValue> {
    let doc: Value = from_js(network, "network")?;
    let network = AgentNetwork::from_value(&doc).map_err(|e| js_error("layeredLayout", e))?;
    let config: LayeredConfig = options(options_value)?;
    let result = LayeredLayout::new(config)
        .compute(&network)
        .map_err(|e| js_error("layeredLayout", e))?;
    to_js(&result)
}

// =========================================================================
// Network builders
// =========================================================================

/// Build a network from a `{ connectivity_info: [{ origin, tools }] }` reply.
#[wasm_bindgen(js_name = buildNetworkFromConnectivity)]
pub fn build_network_from_connectivity(response: JsValue) -> Result<JsValue, JsValue> {
    let response: ConnectivityResponse = from_js(response, "connectivity")?;
    to_js(&build_from_connectivity(&response.connectivity_info))
}

/// Build a possibly incomplete network from an editor definition state.
#[wasm_bindgen(js_name = buildNetworkFromDefinition)]
pub fn build_network_from_definition(
    state: JsValue,
    options_value: JsValue,
) -> Result<JsValue, JsValue> {
    let state: NetworkState = from_js(state, "network state")?;
    let config: LayeredConfig = options(options_value)?;
    to_js(&build_from_definition(&state, &LayeredLayout::new(config)))
}

// =========================================================================
// Tree conversion
// =========================================================================

/// Convert a JSON object into tree items, drawing ids from `id_gen`.
///
/// `id_gen` is called once per key and must return a string. A non-object
/// input yields an empty array.
#[wasm_bindgen(js_name = jsonToTreeData)]
pub fn json_to_tree_data(
    json: JsValue,
    id_gen: &js_sys::Function,
    parent_id: Option<String>,
    depth: Option<u32>,
) -> Result<JsValue, JsValue> {
    let json: Value = from_js(json, "json")?;
    let mut failure: Option<JsValue> = None;
    let mut ids = || match id_gen.call0(&JsValue::NULL) {
        Ok(v) => v.as_string().unwrap_or_else(|| {
            if failure.is_none() {
                failure = Some(js_sys::Error::new("id generator must return a string").into());
            }
            String::new()
        }),
        Err(e) => {
            if failure.is_none() {
                failure = Some(e);
            }
            String::new()
        }
    };
    let items = tree::json_to_tree_data(&json, &mut ids, parent_id.as_deref(), depth.unwrap_or(0));
    if let Some(err) = failure {
        log::error!("jsonToTreeData: id generator failed");
        return Err(err);
    }
    to_js(&items)
}

/// Convert tree items back into a JSON object.
#[wasm_bindgen(js_name = treeDataToJson)]
pub fn tree_data_to_json(items: JsValue) -> Result<JsValue, JsValue> {
    let items: Vec<TreeItem> = from_js(items, "tree items")?;
    to_js(&tree::tree_data_to_json(&items))
}

/// Type a user-edited value: quoted string, number, boolean, null, or text.
#[wasm_bindgen(js_name = parseEditedValue)]
pub fn parse_edited_value(text: &str) -> Result<JsValue, JsValue> {
    to_js(&tree::parse_edited_value(text))
}

/// Split a `key: value` label into `{ key, value }`.
#[wasm_bindgen(js_name = parseLabel)]
pub fn parse_label(label: &str) -> Result<JsValue, JsValue> {
    to_js(&tree::parse_label(label))
}

/// Parse and validate JSON text for import.
#[wasm_bindgen(js_name = importJsonText)]
pub fn import_json_text(text: &str) -> Result<JsValue, JsValue> {
    let value = tree::import_json_text(text).map_err(|e| js_error("importJsonText", e))?;
    to_js(&value)
}

/// Serialize tree items as 2-space indented JSON.
#[wasm_bindgen(js_name = exportJsonText)]
pub fn export_json_text(items: JsValue) -> Result<String, JsValue> {
    let items: Vec<TreeItem> = from_js(items, "tree items")?;
    tree::export_json_text(&items).map_err(|e| js_error("exportJsonText", e))
}

// =========================================================================
// Network engine
// =========================================================================

/// Displayed agent network with layout and position queries.
///
/// This struct wraps the internal NetworkEngine and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen(js_name = NetworkEngine)]
pub struct NetworkEngineWasm {
    engine: NetworkEngine,
}

#[wasm_bindgen(js_class = NetworkEngine)]
impl NetworkEngineWasm {
    /// Create an empty engine.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: NetworkEngine::new(),
        }
    }

    /// Replace the network. Returns how many edges referenced unknown nodes.
    pub fn load(&mut self, network: JsValue) -> Result<usize, JsValue> {
        let doc: Value = from_js(network, "network")?;
        let network = AgentNetwork::from_value(&doc).map_err(|e| js_error("load", e))?;
        Ok(self.engine.load(network))
    }

    pub fn clear(&mut self) {
        self.engine.clear();
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.engine.node_count()
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.engine.edge_count()
    }

    /// Current `{ nodes, edges }`, positions included.
    #[wasm_bindgen(js_name = getNetwork)]
    pub fn get_network(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.network())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    #[wasm_bindgen(js_name = layoutRadial)]
    pub fn layout_radial(&mut self, options_value: JsValue) -> Result<JsValue, JsValue> {
        let config: RadialConfig = options(options_value)?;
        let result = self
            .engine
            .layout_radial(&RadialLayout::new(config))
            .map_err(|e| js_error("layoutRadial", e))?;
        to_js(&result)
    }

    #[wasm_bindgen(js_name = layoutLayered)]
    pub fn layout_layered(&mut self, options_value: JsValue) -> Result<JsValue, JsValue> {
        let config: LayeredConfig = options(options_value)?;
        let result = self
            .engine
            .layout_layered(&LayeredLayout::new(config))
            .map_err(|e| js_error("layoutLayered", e))?;
        to_js(&result)
    }

    // =========================================================================
    // Node Queries
    // =========================================================================

    /// `[x, y]` of a node, if it has a position.
    #[wasm_bindgen(js_name = getNodePosition)]
    pub fn get_node_position(&self, id: &str) -> Option<Vec<f64>> {
        self.engine.position(id).map(|p| vec![p.x, p.y])
    }

    /// Move a node, e.g. after a drag. Returns false for unknown ids or
    /// non-finite coordinates.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        self.engine.set_position(id, Position::new(x, y))
    }

    pub fn children(&self, id: &str) -> Vec<String> {
        self.engine.children(id)
    }

    pub fn parents(&self, id: &str) -> Vec<String> {
        self.engine.parents(id)
    }
}

impl Default for NetworkEngineWasm {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tree editor
// =========================================================================

/// One editing session over a JSON document.
#[wasm_bindgen(js_name = TreeEditor)]
pub struct TreeEditorWasm {
    editor: TreeEditor,
}

#[wasm_bindgen(js_class = TreeEditor)]
impl TreeEditorWasm {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            editor: TreeEditor::new(),
        }
    }

    /// Replace the tree with a validated JSON object.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, json: JsValue) -> Result<(), JsValue> {
        let json: Value = from_js(json, "json")?;
        tree::validate_import(&json).map_err(|e| js_error("loadJson", e))?;
        self.editor.load_json(&json);
        Ok(())
    }

    #[wasm_bindgen(js_name = importText)]
    pub fn import_text(&mut self, text: &str) -> Result<(), JsValue> {
        self.editor
            .import_text(text)
            .map_err(|e| js_error("importText", e))
    }

    #[wasm_bindgen(js_name = exportText)]
    pub fn export_text(&self) -> Result<String, JsValue> {
        self.editor
            .export_text()
            .map_err(|e| js_error("exportText", e))
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.to_json())
    }

    pub fn items(&self) -> Result<JsValue, JsValue> {
        to_js(self.editor.items())
    }

    pub fn find(&self, id: &str) -> Result<JsValue, JsValue> {
        match self.editor.find(id) {
            Some(item) => to_js(item),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Add a leaf under `parent_id`. Returns the new id.
    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(&mut self, parent_id: &str, key: &str, value: JsValue) -> Result<String, JsValue> {
        let value: Value = from_js(value, "value")?;
        self.editor
            .add_child(parent_id, key, value)
            .map_err(|e| js_error("addChild", e))
    }

    /// Add a top-level leaf. Returns the new id.
    #[wasm_bindgen(js_name = addRootItem)]
    pub fn add_root_item(&mut self, key: &str, value: JsValue) -> Result<String, JsValue> {
        let value: Value = from_js(value, "value")?;
        self.editor
            .add_root_item(key, value)
            .map_err(|e| js_error("addRootItem", e))
    }

    /// Remove an item and its subtree, returning it.
    #[wasm_bindgen(js_name = deleteItem)]
    pub fn delete_item(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let removed = self
            .editor
            .delete_item(id)
            .map_err(|e| js_error("deleteItem", e))?;
        to_js(&removed)
    }

    #[wasm_bindgen(js_name = renameKey)]
    pub fn rename_key(&mut self, id: &str, key: &str) -> Result<(), JsValue> {
        self.editor
            .rename_key(id, key)
            .map_err(|e| js_error("renameKey", e))
    }

    #[wasm_bindgen(js_name = editValue)]
    pub fn edit_value(&mut self, id: &str, text: &str) -> Result<(), JsValue> {
        self.editor
            .edit_value(id, text)
            .map_err(|e| js_error("editValue", e))
    }

    #[wasm_bindgen(js_name = editLabel)]
    pub fn edit_label(&mut self, id: &str, label: &str) -> Result<(), JsValue> {
        self.editor
            .edit_label(id, label)
            .map_err(|e| js_error("editLabel", e))
    }

    /// Reparent an item; omit `new_parent` to move it to the top level.
    #[wasm_bindgen(js_name = moveItem)]
    pub fn move_item(&mut self, id: &str, new_parent: Option<String>) -> Result<(), JsValue> {
        self.editor
            .move_item(id, new_parent.as_deref())
            .map_err(|e| js_error("moveItem", e))
    }

    pub fn len(&self) -> usize {
        self.editor.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.editor.is_empty()
    }
}

impl Default for TreeEditorWasm {
    fn default() -> Self {
        Self::new()
    }
}
