//! Dynamic values accepted by the logging facade.
//!
//! Call sites hand the logger loosely-typed arguments: strings, numbers,
//! structured objects, errors, or any mix of them. [`Value`] models those
//! arguments. Objects and arrays are shared, interior-mutable handles, so a
//! graph may reference itself, and object properties may be accessors whose
//! read can fail. The serializer and the normalizer are written to cope
//! with both.

use crate::serialize::MAX_DEPTH;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::backtrace::Backtrace;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Placeholder stored in place of a property whose read failed.
pub const UNSERIALIZABLE: &str = "[unserializable]";

/// Error returned by a failing property accessor.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("property access failed: {0}")]
pub struct AccessError(pub String);

impl AccessError {
    pub fn new(reason: impl Into<String>) -> Self {
        AccessError(reason.into())
    }
}

/// Accessor invoked every time the property is read.
pub type Getter = Arc<dyn Fn() -> Result<Value, AccessError> + Send + Sync>;

/// A single own property of an [`Object`] or [`ErrorValue`].
#[derive(Clone)]
pub enum Prop {
    Data(Value),
    Accessor(Getter),
}

impl Prop {
    /// Read the property, running the accessor if there is one.
    pub fn read(&self) -> Result<Value, AccessError> {
        match self {
            Prop::Data(value) => Ok(value.clone()),
            Prop::Accessor(getter) => getter(),
        }
    }

    /// Read the property, substituting [`UNSERIALIZABLE`] on failure.
    pub fn read_or_placeholder(&self) -> Value {
        self.read()
            .unwrap_or_else(|_| Value::String(UNSERIALIZABLE.to_string()))
    }
}

/// A loosely-typed log argument.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Object),
    Error(ErrorValue),
}

impl Value {
    /// Capture a Rust error as an error value, including its `source()` chain.
    pub fn error<E>(err: &E) -> Value
    where
        E: std::error::Error + ?Sized,
    {
        Value::Error(ErrorValue::from_std(err))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Cycle-safe JSON view of the value, as used by the serializer.
    ///
    /// Values with no JSON form come back as their string coercion.
    pub fn to_json(&self) -> serde_json::Value {
        crate::serialize::to_json(self)
            .unwrap_or_else(|_| serde_json::Value::String(self.to_string()))
    }
}

/// Shared, ordered property map.
#[derive(Clone, Default)]
pub struct Object(Arc<RwLock<IndexMap<String, Prop>>>);

impl Object {
    pub fn new() -> Self {
        Object::default()
    }

    /// Builder-style [`Object::set`].
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.write().insert(key.into(), Prop::Data(value.into()));
    }

    /// Install an accessor property. The closure runs on every read.
    pub fn define_getter<F>(&self, key: impl Into<String>, getter: F)
    where
        F: Fn() -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        self.0.write().insert(key.into(), Prop::Accessor(Arc::new(getter)));
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, AccessError> {
        // Clone out of the lock: an accessor may read this same object.
        let prop = self.0.read().get(key).cloned();
        prop.map(|prop| prop.read()).transpose()
    }

    pub fn remove(&self, key: &str) -> Option<Prop> {
        self.0.write().shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Point-in-time copy of the properties, in insertion order.
    pub fn entries(&self) -> Vec<(String, Prop)> {
        self.0
            .read()
            .iter()
            .map(|(key, prop)| (key.clone(), prop.clone()))
            .collect()
    }

    /// Copy every property of `other` into `self`; existing keys are overwritten.
    ///
    /// Accessors on `other` are read once, a failing read stores
    /// [`UNSERIALIZABLE`].
    pub fn extend_from(&self, other: &Object) {
        for (key, prop) in other.entries() {
            self.set(key, prop.read_or_placeholder());
        }
    }

    /// New object holding the current properties of `self` as data properties.
    pub fn shallow_copy(&self) -> Object {
        let copy = Object::new();
        copy.extend_from(self);
        copy
    }

    /// See [`Value::to_json`].
    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.clone()).to_json()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

/// Shared, growable list of values.
#[derive(Clone, Default)]
pub struct Array(Arc<RwLock<Vec<Value>>>);

impl Array {
    pub fn new() -> Self {
        Array::default()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().push(value.into());
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Array(Arc::new(RwLock::new(values)))
    }
}

struct ErrorInner {
    name: String,
    message: String,
    stack: Option<String>,
    props: RwLock<IndexMap<String, Prop>>,
}

/// An error as seen by the logger: name, message, optional stack and any
/// extra own properties attached by application code.
///
/// Properties named `name`, `message` or `stack` set through
/// [`ErrorValue::set`] are kept but never shadow the built-in fields.
#[derive(Clone)]
pub struct ErrorValue(Arc<ErrorInner>);

impl ErrorValue {
    /// `Error` with the given message and a stack captured at this call.
    pub fn new(message: impl Into<String>) -> Self {
        Self::named("Error", message)
    }

    /// Error with a custom name and a stack captured at this call.
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = format!("{}: {}\n{}", name, message, Backtrace::force_capture());
        Self::from_parts(name, message, Some(stack))
    }

    pub fn from_parts(
        name: impl Into<String>,
        message: impl Into<String>,
        stack: Option<String>,
    ) -> Self {
        ErrorValue(Arc::new(ErrorInner {
            name: name.into(),
            message: message.into(),
            stack,
            props: RwLock::new(IndexMap::new()),
        }))
    }

    /// Convert a Rust error. The `source()` chain is kept as nested `cause`
    /// errors; only the outermost error carries a stack.
    pub fn from_std<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let value = Self::named(short_type_name::<E>(), err.to_string());
        if let Some(source) = err.source() {
            value.set("cause", Value::Error(Self::cause_chain(source)));
        }
        value
    }

    fn cause_chain(err: &(dyn std::error::Error + 'static)) -> Self {
        let value = Self::from_parts("Error", err.to_string(), None);
        if let Some(source) = err.source() {
            value.set("cause", Value::Error(Self::cause_chain(source)));
        }
        value
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn message(&self) -> &str {
        &self.0.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.0.stack.as_deref()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.props.write().insert(key.into(), Prop::Data(value.into()));
    }

    pub fn define_getter<F>(&self, key: impl Into<String>, getter: F)
    where
        F: Fn() -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        self.0
            .props
            .write()
            .insert(key.into(), Prop::Accessor(Arc::new(getter)));
    }

    /// Extra own properties in insertion order.
    pub fn props(&self) -> Vec<(String, Prop)> {
        self.0
            .props
            .read()
            .iter()
            .map(|(key, prop)| (key.clone(), prop.clone()))
            .collect()
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    if full.starts_with("dyn ") {
        return "Error".to_string();
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

// String coercion, used when a value cannot be rendered as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = HashSet::new();
        coerce(self, &mut seen, 0, f)
    }
}

fn coerce(
    value: &Value,
    seen: &mut HashSet<usize>,
    depth: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => f.write_str(&format_number(*n)),
        Value::String(s) => f.write_str(s),
        Value::Object(_) => f.write_str("[object Object]"),
        Value::Error(err) => {
            if err.message().is_empty() {
                f.write_str(err.name())
            } else if err.name().is_empty() {
                f.write_str(err.message())
            } else {
                write!(f, "{}: {}", err.name(), err.message())
            }
        }
        Value::Array(arr) => {
            // A cyclic array, or one nested past the depth limit,
            // contributes nothing.
            if depth > MAX_DEPTH || !seen.insert(arr.id()) {
                return Ok(());
            }
            for (idx, item) in arr.to_vec().iter().enumerate() {
                if idx > 0 {
                    f.write_str(",")?;
                }
                if !matches!(item, Value::Null | Value::Undefined) {
                    coerce(item, seen, depth + 1, f)?;
                }
            }
            seen.remove(&arr.id());
            Ok(())
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::serialize::serialize(self))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:?})", Value::Object(self.clone()))
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array({:?})", Value::Array(self.clone()))
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorValue")
            .field("name", &self.name())
            .field("message", &self.message())
            .field("has_stack", &self.stack().is_some())
            .finish()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<&Object> for Value {
    fn from(obj: &Object) -> Self {
        Value::Object(obj.clone())
    }
}

impl From<Array> for Value {
    fn from(arr: Array) -> Self {
        Value::Array(arr)
    }
}

impl From<ErrorValue> for Value {
    fn from(err: ErrorValue) -> Self {
        Value::Error(err)
    }
}

impl From<&ErrorValue> for Value {
    fn from(err: &ErrorValue) -> Self {
        Value::Error(err.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(Array::from(
            items.into_iter().map(Into::into).collect::<Vec<Value>>(),
        ))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => items.into(),
            serde_json::Value::Object(map) => Value::Object(map.into()),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Object {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let obj = Object::new();
        for (key, value) in map {
            obj.set(key, Value::from(value));
        }
        obj
    }
}
