//! Log events and normalized records
//!
//! An `Event` is what a logger hands to its handler: raw, unmerged, owned by
//! the call that created it. A `Record` is what a handler hands to its
//! renderer: attributes merged, deduplicated and resolved.

use super::caller::Caller;
use super::context::Context;
use super::level::Level;
use super::value::Attr;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Event {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub caller: Option<Caller>,
    pub message: String,
    pub attrs: Vec<Attr>,
    pub context: Context,
}

impl Event {
    pub fn new(
        level: Level,
        time: DateTime<Utc>,
        caller: Option<Caller>,
        message: String,
        context: Context,
    ) -> Self {
        Self {
            level,
            time,
            caller,
            message,
            attrs: Vec::new(),
            context,
        }
    }

    pub fn with_attrs(mut self, attrs: Vec<Attr>) -> Self {
        self.add_attrs(attrs);
        self
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }
}

/// Record in the shape renderers consume
///
/// `attrs` starts with the synthesized timestamp, location and path entries
/// (when enabled), followed by user attributes in precedence order. Every
/// key appears at most once and every value is already resolved.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub attrs: Vec<Attr>,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            attrs: Vec::new(),
        }
    }

    /// Look up a top-level attribute by key
    pub fn get(&self, key: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    #[test]
    fn test_event_collects_attrs() {
        let event = Event::new(
            Level::Info,
            Utc::now(),
            None,
            "hello".to_string(),
            Context::background(),
        )
        .with_attrs(vec![Attr::new("a", 1)]);

        assert_eq!(event.attrs.len(), 1);
        assert_eq!(event.message, "hello");
    }

    #[test]
    fn test_record_lookup() {
        let mut record = Record::new(Level::Warn, "disk");
        record.attrs.push(Attr::new("free_mb", 12_u32));

        assert_eq!(record.get("free_mb").map(|a| &a.value), Some(&Value::Uint64(12)));
        assert!(record.get("missing").is_none());
    }
}
