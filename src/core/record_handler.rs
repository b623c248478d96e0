//! Record handler: attribute merging, deduplication and path tracking
//!
//! For every event the handler builds one record whose attributes come from
//! four sources, each key admitted at most once:
//!
//! 1. synthesized timestamp, location and path entries under reserved keys
//! 2. base attributes fixed when the branch was derived, ancestors first
//! 3. context attributes, innermost batch first
//! 4. call-site attributes
//!
//! A key claimed by an earlier source hides later occurrences. Reserved keys
//! can never be claimed by user attributes.
//!
//! Values are resolved as they are admitted. Attributes built with
//! [`Attr::error`] become `{msg, trace}` groups, and a value whose resolution
//! panics is replaced by the panic error and reported to the side channel.

use super::{
    config::HandlerConfig,
    error::{stderr_error_log, ErrorLog, LoggerError, Result},
    error_fields::{error_value, ErrorExtractor, PlainErrorExtractor},
    event::{Event, Record},
    handler::{Handler, Renderer},
    level::Level,
    metrics::LoggerMetrics,
    value::{Attr, ErrorValue, Value},
};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// The standard [`Handler`], forwarding normalized records to a [`Renderer`]
///
/// Deriving a sub-handler copies the branch state and extends the copy, so
/// any number of threads may derive from the same parent concurrently.
#[derive(Clone)]
pub struct RecordHandler {
    config: Arc<HandlerConfig>,
    path: String,
    attr_keys: HashSet<String>,
    base_attrs: Arc<Vec<Attr>>,
    renderer: Arc<dyn Renderer>,
    error_log: ErrorLog,
    error_extractor: Arc<dyn ErrorExtractor>,
    metrics: Arc<LoggerMetrics>,
}

impl RecordHandler {
    /// Create a root handler with the default field names
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self::from_parts(renderer, HandlerConfig::default())
    }

    /// Create a root handler with custom field names
    ///
    /// Fails when the configuration does not pass [`HandlerConfig::validate`].
    pub fn with_config(renderer: Arc<dyn Renderer>, config: HandlerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(renderer, config))
    }

    fn from_parts(renderer: Arc<dyn Renderer>, config: HandlerConfig) -> Self {
        Self {
            config: Arc::new(config),
            path: String::new(),
            attr_keys: HashSet::new(),
            base_attrs: Arc::new(Vec::new()),
            renderer,
            error_log: stderr_error_log(),
            error_extractor: Arc::new(PlainErrorExtractor),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    /// Replace the side channel renderer failures are reported to
    #[must_use]
    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    /// Extractor used to expand [`Attr::error`] attributes
    #[must_use]
    pub fn with_error_extractor(mut self, extractor: Arc<dyn ErrorExtractor>) -> Self {
        self.error_extractor = extractor;
        self
    }

    /// Share a metrics instance with other handlers
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Path accumulated through derivation, empty for a root handler
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Base attributes registered on this branch, ancestors first
    pub fn base_attrs(&self) -> &[Attr] {
        &self.base_attrs
    }

    fn is_claimed(&self, key: &str) -> bool {
        key.is_empty()
            || self.config.reserved_keys().any(|k| k == key)
            || self.attr_keys.contains(key)
    }

    fn admit(&self, seen: &mut HashSet<String>, key: &str) -> bool {
        if self.is_claimed(key) || seen.contains(key) {
            return false;
        }
        seen.insert(key.to_string());
        true
    }

    /// Derive the state of a sub-branch
    #[must_use]
    pub fn derive(&self, path_segment: &str, attrs: Vec<Attr>) -> RecordHandler {
        let mut child = self.clone();
        if !path_segment.is_empty() {
            child.path.push_str(&child.config.path_separator);
            child.path.push_str(path_segment);
        }

        let mut added = Vec::with_capacity(attrs.len());
        for attr in attrs {
            if child.is_claimed(&attr.key) {
                continue;
            }
            child.attr_keys.insert(attr.key.clone());
            added.push(attr);
        }
        if !added.is_empty() {
            let mut base = Vec::with_capacity(child.base_attrs.len() + added.len());
            base.extend(child.base_attrs.iter().cloned());
            base.extend(added);
            child.base_attrs = Arc::new(base);
        }
        child
    }

    /// Build the record for an event without forwarding it
    pub fn normalize(&self, event: Event) -> Record {
        let Event {
            level,
            time,
            caller,
            message,
            attrs,
            context,
        } = event;
        let config = &self.config;
        let mut record = Record::new(level, message);

        if !config.time_key.is_empty() {
            let formatted = config.timestamp_format.format(&time);
            let time_value = if config.timestamp_format.is_numeric() {
                match formatted.parse::<i64>() {
                    Ok(n) => Value::Int64(n),
                    Err(_) => Value::String(formatted),
                }
            } else {
                Value::String(formatted)
            };
            record.attrs.push(Attr::group(
                config.time_key.as_str(),
                vec![
                    Attr::new("time", time_value),
                    Attr::new("unix_us", time.timestamp_micros()),
                ],
            ));
        }
        if !config.source_key.is_empty() {
            if let Some(caller) = caller {
                let frame = caller.resolve();
                let mut location = Vec::with_capacity(2);
                if let Some(function) = &frame.function {
                    location.push(Attr::new("fn", function.as_str()));
                }
                location.push(Attr::new("file", frame.file_line()));
                record
                    .attrs
                    .push(Attr::group(config.source_key.as_str(), location));
            }
        }
        if !config.path_key.is_empty() && !self.path.is_empty() {
            record
                .attrs
                .push(Attr::new(config.path_key.as_str(), self.path.as_str()));
        }

        for attr in self.base_attrs.iter() {
            record.attrs.push(Attr {
                key: attr.key.clone(),
                value: self.resolve_value(&attr.key, attr.value.clone()),
            });
        }

        let mut seen = HashSet::new();
        for batch in context.attr_batches() {
            for attr in batch.attrs() {
                if self.admit(&mut seen, &attr.key) {
                    record.attrs.push(Attr {
                        key: attr.key.clone(),
                        value: self.resolve_value(&attr.key, attr.value.clone()),
                    });
                }
            }
        }
        for attr in attrs {
            if self.admit(&mut seen, &attr.key) {
                let value = self.resolve_value(&attr.key, attr.value);
                record.attrs.push(Attr {
                    key: attr.key,
                    value,
                });
            }
        }

        record
    }

    fn resolve_value(&self, key: &str, value: Value) -> Value {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let resolved = value.resolve();
            match resolved.downcast_ref::<ErrorValue>() {
                Some(err) => error_value(self.error_extractor.as_ref(), err.get()),
                None => resolved,
            }
        }));

        match result {
            Ok(value) => value,
            Err(panic_info) => {
                self.metrics.record_value_panic();
                let err = LoggerError::value_panicked(key, panic_message(panic_info.as_ref()));
                (self.error_log)(&err);
                Value::Any(Arc::new(err))
            }
        }
    }

    fn forward(&self, record: &Record) {
        let result = catch_unwind(AssertUnwindSafe(|| self.renderer.render(record)));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_emitted();
            }
            Ok(Err(e)) => {
                self.metrics.record_render_failure();
                (self.error_log)(&LoggerError::render_failed(
                    self.renderer.name(),
                    e.to_string(),
                ));
            }
            Err(panic_info) => {
                self.metrics.record_render_panic();
                (self.error_log)(&LoggerError::render_panicked(
                    self.renderer.name(),
                    panic_message(panic_info.as_ref()),
                ));
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Handler for RecordHandler {
    fn enabled(&self, level: Level) -> bool {
        level != Level::None && self.renderer.enabled(level)
    }

    fn handle(&self, event: Event) {
        if !self.enabled(event.level) {
            return;
        }
        let record = self.normalize(event);
        self.forward(&record);
    }

    fn subhandler(&self, path_segment: &str, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(self.derive(path_segment, attrs))
    }
}
