//! Building, rendering and forwarding log records.

use crate::backend::Backend;
use crate::config::LogConfig;
use crate::level::Level;
use crate::normalize::{Message, NormalizedInput};
use crate::record::LogRecord;
use crate::serialize::serialize;
use crate::value::{Object, Value};
use chrono::Utc;
use colored::{Color, Colorize};
use std::sync::{Arc, Once};

/// How records are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Plain line with optional stack and `meta:` trailer.
    Structured,
    /// The same text wrapped in ANSI colors.
    Pretty,
}

impl RenderMode {
    pub fn for_config(config: &LogConfig) -> Self {
        if config.pretty_enabled() {
            RenderMode::Pretty
        } else {
            RenderMode::Structured
        }
    }
}

/// Everything a facade needs to emit: its configuration, the render mode
/// chosen for it, its default metadata and its backend.
///
/// A context is never mutated; re-initialization builds a new one.
pub struct EmitContext {
    pub config: LogConfig,
    pub mode: RenderMode,
    pub defaults: Object,
    pub backend: Arc<dyn Backend>,
}

impl EmitContext {
    pub fn new(config: LogConfig, defaults: Object, backend: Arc<dyn Backend>) -> Self {
        EmitContext {
            mode: RenderMode::for_config(&config),
            config,
            defaults,
            backend,
        }
    }
}

/// Build, render and forward one record. Backend failures are reported on
/// the crate's diagnostics and the record is dropped.
pub fn emit(level: Level, input: NormalizedInput, ctx: &EmitContext) {
    let record = build_record(level, input, &ctx.config, &ctx.defaults);
    let line = render(&record, ctx.mode);
    if let Err(e) = ctx.backend.log(&record, &line) {
        tracing::warn!(error = %e, level = %level, "log backend failed, dropping record");
    }
}

/// Assemble the record for `input`.
///
/// Meta is `defaults` overlaid with the normalized meta. A string `service`
/// key moves into [`LogRecord::service`]; an object message is rendered as
/// text and kept under `meta.payload`.
pub fn build_record(
    level: Level,
    input: NormalizedInput,
    config: &LogConfig,
    defaults: &Object,
) -> LogRecord {
    let meta = defaults.shallow_copy();
    if let Some(extra) = &input.meta {
        meta.extend_from(extra);
    }

    let message = match input.message {
        Message::Text(text) => text,
        Message::Object(payload) => {
            let text = serialize(&Value::Object(payload.clone()));
            meta.set("payload", payload);
            text
        }
    };

    let service = match meta.get("service") {
        Ok(Some(Value::String(service))) => {
            meta.remove("service");
            service
        }
        _ => config.app_name.clone(),
    };

    LogRecord {
        timestamp: Utc::now(),
        level,
        message,
        meta: if meta.is_empty() { None } else { Some(meta) },
        service,
    }
}

/// Render `record` as `"{timestamp} [{level}] {service} - {message}"`, then
/// the error stack on its own line, then (error level only) a `meta:`
/// trailer with everything except the error.
///
/// Pretty mode only adds escape sequences around fragments of the same
/// text.
pub fn render(record: &LogRecord, mode: RenderMode) -> String {
    let mut line = format!(
        "{} [{}] {} - {}",
        record.timestamp_text(),
        paint(mode, level_color(record.level), record.level.as_str()),
        paint(mode, Color::Cyan, &record.service),
        record.message
    );

    if let Some(stack) = error_stack(record) {
        line.push('\n');
        line.push_str(&paint(mode, Color::Red, &stack));
    }

    if record.level == Level::Error {
        if let Some(rest) = residual_meta(record) {
            line.push('\n');
            line.push_str(&paint(mode, Color::BrightBlack, "meta:"));
            line.push(' ');
            line.push_str(&serialize(&Value::Object(rest)));
        }
    }

    line
}

fn error_stack(record: &LogRecord) -> Option<String> {
    let meta = record.meta.as_ref()?;
    let nested = match meta.get("error") {
        Ok(Some(Value::Object(error))) => match error.get("stack") {
            Ok(Some(Value::String(stack))) => Some(stack),
            _ => None,
        },
        _ => None,
    };
    nested.or_else(|| match meta.get("stack") {
        Ok(Some(Value::String(stack))) => Some(stack),
        _ => None,
    })
}

fn residual_meta(record: &LogRecord) -> Option<Object> {
    let rest = record.meta.as_ref()?.shallow_copy();
    rest.remove("error");
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info | Level::Http => Color::Green,
        Level::Verbose => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Silly => Color::Magenta,
    }
}

static FORCE_COLORS: Once = Once::new();

fn paint(mode: RenderMode, color: Color, text: &str) -> String {
    match mode {
        RenderMode::Structured => text.to_string(),
        RenderMode::Pretty => {
            // Pretty mode was chosen by config; ignore tty and CLICOLOR detection.
            FORCE_COLORS.call_once(|| colored::control::set_override(true));
            text.color(color).to_string()
        }
    }
}
