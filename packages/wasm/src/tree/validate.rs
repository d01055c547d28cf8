//! Import validation and export formatting for the tree editor.
//!
//! A document must be a non-null, non-array JSON object with non-empty keys
//! everywhere and bounded nesting before it is converted. Reference cycles
//! cannot occur in a parsed `serde_json::Value`, so the nesting bound is the
//! only structural walk needed.

use serde_json::Value;

use super::convert::tree_data_to_json;
use super::item::{TreeItem, ValueType};
use crate::error::ImportError;

/// Deepest nesting accepted on import. Matches serde_json's own recursion
/// limit for text input.
pub const MAX_IMPORT_DEPTH: usize = 128;

/// Check that `value` may be fed to the converter.
pub fn validate_import(value: &Value) -> Result<(), ImportError> {
    match value {
        Value::Null => return Err(ImportError::NullRoot),
        Value::Array(_) => return Err(ImportError::ArrayRoot),
        Value::Object(_) => {}
        other => {
            return Err(ImportError::NotAnObject {
                found: ValueType::of(other),
            });
        }
    }
    check_keys(value, &mut String::new(), 0)
}

fn check_keys(value: &Value, path: &mut String, depth: usize) -> Result<(), ImportError> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(ImportError::TooDeep {
            limit: MAX_IMPORT_DEPTH,
        });
    }
    let mark = path.len();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push('/');
                path.push_str(key);
                if key.trim().is_empty() {
                    return Err(ImportError::EmptyKey { path: path.clone() });
                }
                check_keys(child, path, depth + 1)?;
                path.truncate(mark);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push('/');
                path.push_str(&i.to_string());
                check_keys(child, path, depth + 1)?;
                path.truncate(mark);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Parse and validate JSON text offered for import.
pub fn import_json_text(text: &str) -> Result<Value, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    validate_import(&value)?;
    Ok(value)
}

/// Serialize tree items as 2-space indented JSON.
pub fn export_json_text(items: &[TreeItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&tree_data_to_json(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SequentialIds, json_to_tree_data};
    use serde_json::json;

    #[test]
    fn test_accepts_plain_object() {
        assert!(validate_import(&json!({ "a": { "b": [1, { "c": null }] } })).is_ok());
        assert!(validate_import(&json!({})).is_ok());
    }

    #[test]
    fn test_rejects_bad_roots() {
        assert!(matches!(validate_import(&Value::Null), Err(ImportError::NullRoot)));
        assert!(matches!(validate_import(&json!([])), Err(ImportError::ArrayRoot)));
        assert!(matches!(
            validate_import(&json!("text")),
            Err(ImportError::NotAnObject {
                found: ValueType::String
            })
        ));
    }

    #[test]
    fn test_empty_key_reports_path() {
        let err = validate_import(&json!({ "a": { "ok": 1, " ": 2 } })).unwrap_err();
        match err {
            ImportError::EmptyKey { path } => assert_eq!(path, "/a/ "),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_key_inside_array() {
        let err = validate_import(&json!({ "list": [0, { "": 1 }] })).unwrap_err();
        match err {
            ImportError::EmptyKey { path } => assert_eq!(path, "/list/1/"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_deep() {
        let mut value = json!(1);
        for _ in 0..=MAX_IMPORT_DEPTH + 1 {
            value = json!({ "n": value });
        }
        assert!(matches!(
            validate_import(&value),
            Err(ImportError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_import_text() {
        assert_eq!(import_json_text("{\"a\": 1}").unwrap(), json!({ "a": 1 }));
        assert!(matches!(import_json_text("{"), Err(ImportError::Parse(_))));
        assert!(matches!(import_json_text("null"), Err(ImportError::NullRoot)));
    }

    #[test]
    fn test_export_two_space_indent() {
        let items = json_to_tree_data(&json!({ "a": { "b": 1 } }), &mut SequentialIds::new(), None, 0);
        let text = export_json_text(&items).unwrap();
        assert_eq!(text, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
    }
}
