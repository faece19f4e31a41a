//! Turning a variadic argument list into a `{message, meta}` pair.

use crate::capture::capture;
use crate::serialize::serialize;
use crate::value::{Array, ErrorValue, Object, Value};

/// Message half of a [`NormalizedInput`].
///
/// Object messages stay objects until the record is rendered, so a
/// structured consumer still receives native fields.
#[derive(Clone, Debug)]
pub enum Message {
    Text(String),
    Object(Object),
}

impl Message {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(text) => Some(text),
            Message::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Message::Object(obj) => Some(obj),
            Message::Text(_) => None,
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::Text(String::new())
    }
}

/// Result of [`normalize`].
#[derive(Clone, Debug, Default)]
pub struct NormalizedInput {
    pub message: Message,
    pub meta: Option<Object>,
}

impl NormalizedInput {
    fn text(message: impl Into<String>) -> Self {
        NormalizedInput {
            message: Message::Text(message.into()),
            meta: None,
        }
    }
}

/// Call shape, decided from the first argument.
enum Shape<'a> {
    Empty,
    Error(&'a ErrorValue, &'a [Value]),
    Text(&'a str, &'a [Value]),
    Object(&'a Object, &'a [Value]),
    Primitive,
}

fn classify(args: &[Value]) -> Shape<'_> {
    match args.split_first() {
        None => Shape::Empty,
        Some((Value::Error(err), rest)) => Shape::Error(err, rest),
        Some((Value::String(text), rest)) => Shape::Text(text, rest),
        Some((Value::Object(obj), rest)) => Shape::Object(obj, rest),
        Some(_) => Shape::Primitive,
    }
}

/// Classify and merge `args`.
///
/// - no arguments: empty message;
/// - error first: `"<name>: <message>"`, snapshot under `meta.error`, plus the
///   fields of a trailing object;
/// - string first: the string alone, the string with one trailing object as
///   meta, or everything space-joined;
/// - object first: all object arguments merged, later keys winning;
/// - anything else: the whole argument list serialized as an array.
pub fn normalize(args: &[Value]) -> NormalizedInput {
    match classify(args) {
        Shape::Empty => NormalizedInput::text(""),
        Shape::Error(err, rest) => {
            let snapshot = capture(err);
            let meta = match rest.first() {
                Some(Value::Object(extra)) => extra.shallow_copy(),
                _ => Object::new(),
            };
            meta.set("error", snapshot.to_object());
            NormalizedInput {
                message: Message::Text(snapshot.headline()),
                meta: Some(meta),
            }
        }
        Shape::Text(text, rest) => match rest {
            [] => NormalizedInput::text(text),
            [Value::Object(meta)] => NormalizedInput {
                message: Message::Text(text.to_string()),
                meta: Some(meta.clone()),
            },
            [Value::Error(err)] => NormalizedInput {
                message: Message::Text(text.to_string()),
                meta: Some(Object::new().with("error", capture(err).to_object())),
            },
            _ => NormalizedInput::text(join_words(text, rest)),
        },
        Shape::Object(first, rest) => {
            let merged = first.shallow_copy();
            for value in rest {
                if let Value::Object(obj) = value {
                    merged.extend_from(obj);
                }
            }
            NormalizedInput {
                message: Message::Object(merged),
                meta: None,
            }
        }
        Shape::Primitive => {
            NormalizedInput::text(serialize(&Value::Array(Array::from(args.to_vec()))))
        }
    }
}

fn join_words(first: &str, rest: &[Value]) -> String {
    let mut line = first.to_string();
    for value in rest {
        line.push(' ');
        match value {
            Value::String(s) => line.push_str(s),
            other => line.push_str(&serialize(other)),
        }
    }
    line
}
