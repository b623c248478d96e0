//! JSON renderer for structured logging
//!
//! Writes each record as a single-line JSON object (JSONL), compatible with
//! log aggregation tools like ELK or Loki.

use super::sync_writer::LineSink;
use crate::core::{
    config::{LEVEL_KEY, MESSAGE_KEY},
    Level, Record, Renderer, Result,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

pub struct JsonRenderer {
    sink: Arc<dyn LineSink>,
    min_level: Level,
}

impl JsonRenderer {
    pub fn new(sink: Arc<dyn LineSink>) -> Self {
        Self {
            sink,
            min_level: Level::Debug,
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Encode a record without writing it
    pub fn format(&self, record: &Record) -> Result<String> {
        Ok(serde_json::to_string(&JsonLine(record))?)
    }
}

/// Serializes a record as a map in record order
struct JsonLine<'a>(&'a Record);

impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let record = self.0;
        let mut map = serializer.serialize_map(Some(record.attrs.len() + 2))?;
        map.serialize_entry(LEVEL_KEY, record.level.to_str())?;
        map.serialize_entry(MESSAGE_KEY, &record.message)?;
        for attr in &record.attrs {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

impl Renderer for JsonRenderer {
    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    fn render(&self, record: &Record) -> Result<()> {
        let mut line = serde_json::to_vec(&JsonLine(record))?;
        line.push(b'\n');
        self.sink.write_line(&line)
    }

    fn name(&self) -> &str {
        "json"
    }
}
