//! JSONL tracing layer.
//!
//! Writes one JSON object per event. The context fields emitted by
//! [`log_event!`](crate::log_event) (`run_id`, `scenario`, `stage`) and a
//! strategy `method` are lifted to the top level; every other field goes
//! under `fields`. Non-finite floats are written as strings (`"inf"`).

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::events::Level;

const TOP_LEVEL_FIELDS: [&str; 4] = ["run_id", "scenario", "stage", "method"];

#[derive(Default)]
struct EventRecord {
    message: Option<String>,
    context: Map<String, Value>,
    fields: Map<String, Value>,
}

impl EventRecord {
    fn insert(&mut self, name: &str, value: Value) {
        if name == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else if TOP_LEVEL_FIELDS.contains(&name) {
            // Context not yet known (no scenario loaded) is recorded as "".
            if value.as_str() != Some("") {
                self.context.insert(name.to_string(), value);
            }
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }

    fn into_line(self, level: Level, event: &str) -> Value {
        let mut line = self.context;
        line.insert("ts".to_string(), Value::String(Utc::now().to_rfc3339()));
        line.insert("level".to_string(), serde_json::json!(level));
        line.insert("event".to_string(), Value::String(event.to_string()));
        if let Some(message) = self.message {
            line.insert("message".to_string(), Value::String(message));
        }
        if !self.fields.is_empty() {
            line.insert("fields".to_string(), Value::Object(self.fields));
        }
        Value::Object(line)
    }
}

impl Visit for EventRecord {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field.name(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field.name(), Value::String(format!("{value:?}")));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field.name(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field.name(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.insert(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field.name(), Value::Bool(value));
    }
}

/// Tracing layer writing JSON lines, stderr by default.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber,
    W: Write + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut record = EventRecord::default();
        event.record(&mut record);

        let metadata = event.metadata();
        let line = record.into_line((*metadata.level()).into(), metadata.target());
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
        }
    }
}
