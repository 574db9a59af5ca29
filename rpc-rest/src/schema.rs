//! The schema adapter: wraps a caller-supplied
//! validator so that string-shaped path/query values are coerced to their
//! declared primitive type before validation, for validator libraries that
//! don't natively coerce.
//!
//! The validator itself -- how it composes nested object shapes, what issue
//! format it produces internally -- is an external collaborator. This
//! module only defines the narrow [`Schema`] trait the rest of the adapter
//! needs, plus the leaf-coercion wrapper described in step 2.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One structured-validation failure, matching the shape handed back inside
/// a `BAD_REQUEST` body's `issues` array.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Issue {
    pub code: String,
    pub path: Vec<Value>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl Issue {
    /// Convenience constructor for the common `invalid_type` shape.
    pub fn invalid_type(path: Vec<Value>, expected: &str, received: &str) -> Issue {
        Issue {
            code: "invalid_type".to_owned(),
            message: format!("Expected {}, received {}", expected, received),
            path,
            expected: Some(expected.to_owned()),
            received: Some(received.to_owned()),
        }
    }
}

/// The primitive shape of a top-level input key, used only to drive query/path
/// coercion -- never consulted for body-shaped fields, which are already
/// correctly typed by JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Number,
    Integer,
    Boolean,
}

/// A structured-object (or void) validator, supplied by the external
/// procedure router.
pub trait Schema: Send + Sync {
    /// True for the "void" validator that accepts only absence of a value.
    fn is_void(&self) -> bool {
        false
    }

    /// Validate (and possibly transform) `value`, returning either the value
    /// invocation should see or a non-empty list of issues.
    fn validate(&self, value: Value) -> Result<Value, Vec<Issue>>;

    /// Whether this validator already coerces primitive-shaped strings
    /// itself. Schemas returning `true` opt out of the wrapper below
    /// entirely.
    fn coerces_natively(&self) -> bool {
        false
    }

    /// The declared primitive type of named top-level keys, consulted only
    /// when [`Self::coerces_natively`] is false. Schemas that can't describe
    /// their own shape return an empty map and no coercion happens for them.
    fn leaf_kinds(&self) -> HashMap<String, LeafKind> {
        HashMap::new()
    }

    /// Whether this validator describes a structured object (as opposed to
    /// void, a scalar, or an array). The route table requires every
    /// procedure's *output* schema to report `true` here at construction
    /// time -- a missing or non-object output schema is the one
    /// mis-declaration this adapter refuses to silently ship.
    fn declares_object_shape(&self) -> bool {
        false
    }
}

/// The "void" validator: accepts only the absence of a value.
pub struct VoidSchema;

impl Schema for VoidSchema {
    fn is_void(&self) -> bool {
        true
    }
    fn validate(&self, value: Value) -> Result<Value, Vec<Issue>> {
        if value.is_null() {
            Ok(Value::Null)
        } else {
            Err(vec![Issue::invalid_type(vec![], "void", json_type_name(&value))])
        }
    }
}

/// Coerce string leaves at `url_keys` (the names of keys that originated
/// from the URL -- path params and query params) to the primitive type the
/// schema declares for them. Keys that came from the body are never present
/// in `url_keys` and so are never touched: coercion only ever applies to
/// leaves whose declared type is a primitive non-string, never to bodies
/// already typed by JSON.
pub fn coerce_url_leaves(schema: &dyn Schema, value: &mut Value, url_keys: &HashSet<String>) {
    if schema.coerces_natively() {
        return;
    }
    let leaf_kinds = schema.leaf_kinds();
    if leaf_kinds.is_empty() {
        return;
    }
    let map = match value.as_object_mut() {
        Some(map) => map,
        None => return,
    };
    for (key, kind) in &leaf_kinds {
        if !url_keys.contains(key) {
            continue;
        }
        if let Some(slot) = map.get_mut(key) {
            coerce_leaf(slot, *kind);
        }
    }
}

fn coerce_leaf(slot: &mut Value, kind: LeafKind) {
    let s = match slot.as_str() {
        Some(s) => s.to_owned(),
        None => return,
    };
    match kind {
        LeafKind::Number => {
            if let Ok(n) = s.parse::<f64>() {
                if let Some(num) = serde_json::Number::from_f64(n) {
                    *slot = Value::Number(num);
                }
            }
        }
        LeafKind::Integer => {
            if let Ok(n) = s.parse::<i64>() {
                *slot = Value::Number(n.into());
            }
        }
        LeafKind::Boolean => match s.as_str() {
            "true" => *slot = Value::Bool(true),
            "false" => *slot = Value::Bool(false),
            _ => {}
        },
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
