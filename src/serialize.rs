//! Total, cycle-aware rendering of [`Value`]s.

use crate::capture::{capture, ErrorSnapshot};
use crate::value::{AccessError, Object, Value};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as Json};
use std::collections::HashSet;

/// Marker written in place of an object that was already visited.
pub const CIRCULAR: &str = "[Circular]";

/// Deepest nesting rendered before falling back to string coercion; the
/// coercion itself stops descending at the same depth.
pub(crate) const MAX_DEPTH: usize = 128;

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(thiserror::Error, Debug)]
pub(crate) enum SerializeError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("value nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("value has no JSON representation")]
    Unrepresentable,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Render `value` as 2-space indented JSON.
///
/// Errors are expanded into their snapshot, repeated objects become
/// `"[Circular]"`. Never fails: anything that cannot be rendered (a failing
/// accessor, runaway nesting, a bare `undefined`) degrades to the value's
/// string coercion.
pub fn serialize(value: &Value) -> String {
    let rendered = to_json(value)
        .and_then(|json| serde_json::to_string_pretty(&json).map_err(SerializeError::from));
    match rendered {
        Ok(text) => text,
        Err(err) => {
            tracing::trace!(error = %err, "serialization degraded to string coercion");
            value.to_string()
        }
    }
}

pub(crate) fn to_json(value: &Value) -> Result<Json, SerializeError> {
    Walker::default()
        .walk(value, 0)?
        .ok_or(SerializeError::Unrepresentable)
}

#[derive(Default)]
struct Walker {
    seen: HashSet<usize>,
}

impl Walker {
    /// `Ok(None)` means "omit": `undefined` has no JSON form.
    fn walk(&mut self, value: &Value, depth: usize) -> Result<Option<Json>, SerializeError> {
        if depth > MAX_DEPTH {
            return Err(SerializeError::TooDeep(MAX_DEPTH));
        }

        let json = match value {
            Value::Undefined => return Ok(None),
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Error(err) => {
                // Snapshot first, then track identity so an error that
                // references itself still terminates.
                let snapshot = capture(err);
                if !self.seen.insert(err.id()) {
                    return Ok(Some(circular()));
                }
                self.walk_snapshot(&snapshot, depth)?
            }
            Value::Array(arr) => {
                if !self.seen.insert(arr.id()) {
                    return Ok(Some(circular()));
                }
                let mut items = Vec::with_capacity(arr.len());
                for item in arr.to_vec() {
                    items.push(self.walk(&item, depth + 1)?.unwrap_or(Json::Null));
                }
                Json::Array(items)
            }
            Value::Object(obj) => {
                if !self.seen.insert(obj.id()) {
                    return Ok(Some(circular()));
                }
                let mut map = Map::new();
                for (key, prop) in obj.entries() {
                    let child = prop.read()?;
                    if let Some(json) = self.walk(&child, depth + 1)? {
                        map.insert(key, json);
                    }
                }
                Json::Object(map)
            }
        };
        Ok(Some(json))
    }

    fn walk_snapshot(
        &mut self,
        snapshot: &ErrorSnapshot,
        depth: usize,
    ) -> Result<Json, SerializeError> {
        let mut map = Map::new();
        map.insert("name".into(), Json::String(snapshot.name.clone()));
        map.insert("message".into(), Json::String(snapshot.message.clone()));
        if let Some(stack) = &snapshot.stack {
            map.insert("stack".into(), Json::String(stack.clone()));
        }
        for (key, value) in &snapshot.extra {
            if let Some(json) = self.walk(value, depth + 1)? {
                map.insert(key.clone(), json);
            }
        }
        Ok(Json::Object(map))
    }
}

fn circular() -> Json {
    Json::String(CIRCULAR.to_string())
}

fn number_to_json(n: f64) -> Json {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Json::from(n as i64)
    } else {
        Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match to_json(self) {
            Ok(json) => json.serialize(serializer),
            Err(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::Object(self.clone()).serialize(serializer)
    }
}
