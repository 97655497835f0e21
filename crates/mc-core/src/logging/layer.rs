//! Custom tracing layer for JSONL output.
//!
//! Each event becomes one JSON object on its own line. The enclosing
//! pipeline span's `pass_id`, `meter` and `stage` are flattened into the
//! object so a single pass can be followed across stages.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

/// Span fields copied onto every event recorded inside the span.
const CONTEXT_KEYS: [&str; 3] = ["pass_id", "meter", "stage"];

/// Context captured from one span's attributes.
#[derive(Debug, Clone, Default)]
struct SpanContext(BTreeMap<&'static str, serde_json::Value>);

/// Collects tracing fields as JSON values.
///
/// Events keep every field; spans keep only [`CONTEXT_KEYS`].
#[derive(Default)]
struct JsonFieldVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
    context_only: bool,
}

impl JsonFieldVisitor {
    fn for_span() -> Self {
        JsonFieldVisitor {
            context_only: true,
            ..Self::default()
        }
    }

    fn insert(&mut self, field: &tracing::field::Field, value: serde_json::Value) {
        let name = field.name();
        if self.context_only && !CONTEXT_KEYS.contains(&name) {
            return;
        }
        if name == "message" && !self.context_only {
            self.message = Some(match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            });
            return;
        }
        self.fields.insert(name.to_string(), value);
    }

    fn into_context(self) -> SpanContext {
        SpanContext(
            CONTEXT_KEYS
                .iter()
                .filter_map(|key| self.fields.get(*key).map(|v| (*key, v.clone())))
                .collect(),
        )
    }
}

impl tracing::field::Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.insert(field, serde_json::Value::String(format!("{:?}", value)));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.insert(field, serde_json::Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, value.into());
    }
}

/// Tracing layer writing one JSON object per event.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    /// Layer writing to `writer`, e.g. an in-memory buffer in tests.
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = JsonFieldVisitor::for_span();
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.into_context());
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let level = Level::from(*meta.level());
        let mut line = serde_json::json!({
            "ts": Utc::now().to_rfc3339(),
            "level": level,
            "event": meta.target(),
        });
        let Some(obj) = line.as_object_mut() else {
            return;
        };

        // Scope runs innermost first, so the nearest span wins each key
        for span in ctx.event_scope(event).into_iter().flatten() {
            if let Some(SpanContext(values)) = span.extensions().get::<SpanContext>() {
                for (key, value) in values {
                    obj.entry(*key).or_insert_with(|| value.clone());
                }
            }
        }
        if let Some(message) = visitor.message {
            obj.insert("message".into(), message.into());
        }
        if !visitor.fields.is_empty() {
            obj.insert("fields".into(), visitor.fields.into());
        }

        if let Ok(mut out) = self.writer.lock() {
            let _ = serde_json::to_writer(&mut *out, &line);
            let _ = out.write_all(b"\n");
        }
    }
}
