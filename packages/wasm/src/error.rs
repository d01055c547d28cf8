//! Error types for layout, import, and tree editing.
//!
//! Every fallible operation in the crate returns one of these enums. The
//! wasm boundary in `lib.rs` logs them and hands the display text to JS as
//! an `Error` object.

use thiserror::Error;

use crate::tree::ValueType;

/// Failure to lay out an agent network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The network document did not carry the expected shape.
    #[error("malformed network: `{field}` must be an array of {expected}")]
    MalformedInput {
        field: &'static str,
        expected: &'static str,
    },

    /// No node without an incoming edge exists.
    #[error("No root node found")]
    NoRoot,

    /// A numeric layout option is unusable.
    #[error("invalid layout option `{name}`: {value}")]
    InvalidConfig { name: &'static str, value: f64 },
}

/// Rejection of a JSON document offered for import into the tree editor.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("imported JSON must not be null")]
    NullRoot,

    #[error("imported JSON must be an object, not an array")]
    ArrayRoot,

    #[error("imported JSON must be an object, found {found}")]
    NotAnObject { found: ValueType },

    #[error("empty key at `{path}`")]
    EmptyKey { path: String },

    #[error("imported JSON nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Failure of an in-place edit on a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no tree item with id `{id}`")]
    UnknownItem { id: String },

    #[error("cannot move `{id}` under itself")]
    MoveIntoSelf { id: String },

    #[error("cannot move `{id}` under its own descendant `{target}`")]
    MoveIntoDescendant { id: String, target: String },

    #[error("keys must not be empty")]
    EmptyKey,

    #[error("tree item `{id}` is not a key/value pair")]
    NotAKeyValuePair { id: String },

    /// Values live on leaves only.
    #[error("tree item `{id}` has children and cannot hold a value")]
    HasChildren { id: String },
}
