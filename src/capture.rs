use crate::value::{ErrorValue, Object, Value};
use indexmap::IndexMap;

/// Field names every snapshot carries ahead of the extra properties.
const BUILTIN_FIELDS: [&str; 3] = ["name", "message", "stack"];

/// Immutable copy of an error's properties.
///
/// A snapshot holds no reference to the error it was taken from, so it
/// stays valid after the error is dropped.
#[derive(Clone, Debug)]
pub struct ErrorSnapshot {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    /// Remaining own properties, in the order they were attached.
    pub extra: IndexMap<String, Value>,
}

impl ErrorSnapshot {
    /// `"<name>: <message>"`, the human-readable headline of the error.
    pub fn headline(&self) -> String {
        format!("{}: {}", self.name, self.message)
    }

    /// Plain object form: `name`, `message`, `stack` (when present), then
    /// the extra properties.
    pub fn to_object(&self) -> Object {
        let obj = Object::new()
            .with("name", self.name.as_str())
            .with("message", self.message.as_str());
        if let Some(stack) = &self.stack {
            obj.set("stack", stack.as_str());
        }
        for (key, value) in &self.extra {
            obj.set(key.as_str(), value.clone());
        }
        obj
    }
}

/// Capture every property of `err`.
///
/// Each extra property is read on its own; one failing accessor only
/// replaces that property with `"[unserializable]"`.
pub fn capture(err: &ErrorValue) -> ErrorSnapshot {
    let mut extra = IndexMap::new();
    for (key, prop) in err.props() {
        if BUILTIN_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let value = prop.read_or_placeholder();
        extra.insert(key, value);
    }

    ErrorSnapshot {
        name: err.name().to_string(),
        message: err.message().to_string(),
        stack: err.stack().map(str::to_string),
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{AccessError, UNSERIALIZABLE};
    use serde_json::json;

    #[test]
    fn captures_builtin_fields() {
        let err = ErrorValue::new("boom");
        let snapshot = capture(&err);
        assert_eq!(snapshot.name, "Error");
        assert_eq!(snapshot.message, "boom");
        assert!(snapshot.stack.as_deref().unwrap().starts_with("Error: boom"));
        assert!(snapshot.extra.is_empty());
    }

    #[test]
    fn captures_custom_properties_in_order() {
        let err = ErrorValue::from_parts("HttpError", "not found", None);
        err.set("statusCode", 404);
        err.set("code", "E1");

        let snapshot = capture(&err);
        let keys: Vec<&str> = snapshot.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["statusCode", "code"]);
        assert_eq!(
            snapshot.to_object().to_json(),
            json!({"name": "HttpError", "message": "not found", "statusCode": 404, "code": "E1"})
        );
    }

    #[test]
    fn failing_property_is_isolated() {
        let err = ErrorValue::from_parts("Error", "partial", None);
        err.set("before", 1);
        err.define_getter("secret", || Err(AccessError::new("locked")));
        err.set("after", 2);

        let snapshot = capture(&err);
        assert_eq!(snapshot.extra["before"].to_json(), json!(1));
        assert_eq!(snapshot.extra["secret"].as_str(), Some(UNSERIALIZABLE));
        assert_eq!(snapshot.extra["after"].to_json(), json!(2));
    }

    #[test]
    fn builtin_names_are_not_overridden() {
        let err = ErrorValue::from_parts("Error", "real", None);
        err.set("message", "shadow");
        let snapshot = capture(&err);
        assert_eq!(snapshot.message, "real");
        assert!(!snapshot.extra.contains_key("message"));
    }

    #[test]
    fn snapshot_outlives_error() {
        let snapshot = {
            let err = ErrorValue::from_parts("Error", "gone", None);
            err.set("code", "E2");
            capture(&err)
        };
        assert_eq!(snapshot.headline(), "Error: gone");
        assert_eq!(snapshot.extra["code"].as_str(), Some("E2"));
    }
}
