//! Logger facade
//!
//! A `Logger` is a cheap, clonable handle: a handler branch, a severity
//! floor, a clock and an error extractor. Every operation takes the
//! execution [`Context`] explicitly.

use super::{
    caller::Caller,
    config::{LoggerConfig, OutputFormat},
    context::Context,
    error::Result,
    error_fields::{error_fields, ErrorExtractor, PlainErrorExtractor},
    event::Event,
    handler::{Handler, Renderer},
    level::Level,
    record_handler::RecordHandler,
    timestamp::{Clock, RealTime},
    value::Attr,
};
use crate::renderers::{JsonRenderer, LineSink, SyncWriter, TextRenderer};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
    min_level: Level,
    clock: Arc<dyn Clock>,
    error_extractor: Arc<dyn ErrorExtractor>,
}

impl Logger {
    /// Create a logger writing text lines to stdout at INFO and above
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Create a root logger from a configuration, writing lines to `sink`
    ///
    /// # Example
    ///
    /// ```
    /// use context_logger::renderers::SyncWriter;
    /// use context_logger::{Context, Logger, LoggerConfig};
    /// use std::sync::Arc;
    ///
    /// let config = LoggerConfig::from_json(r#"{"format":"json"}"#).unwrap();
    /// let out = Arc::new(SyncWriter::new(Vec::new()));
    /// let logger = Logger::from_config(&config, out.clone()).unwrap();
    ///
    /// logger.info(&Context::background(), "ready", vec![]);
    /// assert!(out.contents().starts_with(r#"{"level":"INFO","msg":"ready""#));
    /// ```
    pub fn from_config(config: &LoggerConfig, sink: Arc<dyn LineSink>) -> Result<Self> {
        let renderer: Arc<dyn Renderer> = match config.format {
            OutputFormat::Text => Arc::new(TextRenderer::new(sink)),
            OutputFormat::Json => Arc::new(JsonRenderer::new(sink)),
        };
        let handler = RecordHandler::with_config(renderer, config.handler.clone())?;

        Ok(LoggerBuilder::new()
            .min_level(config.min_level)
            .handler(Arc::new(handler))
            .build())
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Whether a record at `level` would be emitted
    ///
    /// `Level::None` is never emitted.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level != Level::None && level >= self.min_level && self.handler.enabled(level)
    }

    /// Log a record, attributing it to the caller of this method
    ///
    /// Does no work at all when `level` is disabled.
    #[track_caller]
    pub fn log(
        &self,
        ctx: &Context,
        level: Level,
        message: impl Into<String>,
        attrs: Vec<Attr>,
    ) {
        if !self.enabled(level) {
            return;
        }
        self.emit(ctx, level, Caller::capture(), message.into(), attrs);
    }

    /// Log a record attributed to an explicitly captured call site
    ///
    /// For wrappers that cannot be marked `#[track_caller]`.
    pub fn log_with_caller(
        &self,
        ctx: &Context,
        level: Level,
        caller: Caller,
        message: impl Into<String>,
        attrs: Vec<Attr>,
    ) {
        if !self.enabled(level) {
            return;
        }
        self.emit(ctx, level, caller, message.into(), attrs);
    }

    fn emit(&self, ctx: &Context, level: Level, caller: Caller, message: String, attrs: Vec<Attr>) {
        let event = Event::new(level, self.clock.now(), Some(caller), message, ctx.clone())
            .with_attrs(attrs);
        self.handler.handle(event);
    }

    /// Derive a logger for a named sub-component
    ///
    /// An empty `path_segment` keeps the path. `attrs` are attached to every
    /// record of the new logger and its descendants; keys an ancestor already
    /// registered are ignored.
    #[must_use]
    pub fn sublogger(&self, path_segment: &str, attrs: Vec<Attr>) -> Logger {
        Logger {
            handler: self.handler.subhandler(path_segment, attrs),
            min_level: self.min_level,
            clock: Arc::clone(&self.clock),
            error_extractor: Arc::clone(&self.error_extractor),
        }
    }

    #[track_caller]
    pub fn debug(&self, ctx: &Context, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(ctx, Level::Debug, message, attrs);
    }

    #[track_caller]
    pub fn info(&self, ctx: &Context, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(ctx, Level::Info, message, attrs);
    }

    #[track_caller]
    pub fn warn(&self, ctx: &Context, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(ctx, Level::Warn, message, attrs);
    }

    #[track_caller]
    pub fn error(&self, ctx: &Context, message: impl Into<String>, attrs: Vec<Attr>) {
        self.log(ctx, Level::Error, message, attrs);
    }

    /// Log an error value at ERROR
    ///
    /// The record carries an `err` group with the error text and trace ahead
    /// of `attrs`. The record message comes from the error extractor.
    #[track_caller]
    pub fn err(&self, ctx: &Context, err: &(dyn Error + 'static), attrs: Vec<Attr>) {
        self.log_error_value(ctx, Level::Error, Caller::capture(), err, attrs);
    }

    /// Log an error value at WARN
    #[track_caller]
    pub fn warn_err(&self, ctx: &Context, err: &(dyn Error + 'static), attrs: Vec<Attr>) {
        self.log_error_value(ctx, Level::Warn, Caller::capture(), err, attrs);
    }

    fn log_error_value(
        &self,
        ctx: &Context,
        level: Level,
        caller: Caller,
        err: &(dyn Error + 'static),
        attrs: Vec<Attr>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let (message, group) = error_fields(self.error_extractor.as_ref(), err);
        let mut all = Vec::with_capacity(attrs.len() + 1);
        all.push(group);
        all.extend(attrs);
        self.emit(ctx, level, caller, message, all);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use context_logger::renderers::{SyncWriter, TextRenderer};
/// use context_logger::{Attr, Level, Logger, RecordHandler};
/// use std::sync::Arc;
///
/// let out = Arc::new(SyncWriter::new(Vec::new()));
/// let handler = RecordHandler::new(Arc::new(TextRenderer::new(out.clone())));
///
/// let logger = Logger::builder()
///     .min_level(Level::Debug)
///     .handler(Arc::new(handler))
///     .subhandler("api", vec![Attr::new("version", "v2")])
///     .build();
///
/// assert!(logger.enabled(Level::Debug));
/// ```
pub struct LoggerBuilder {
    min_level: Level,
    handler: Option<Arc<dyn Handler>>,
    clock: Arc<dyn Clock>,
    error_extractor: Arc<dyn ErrorExtractor>,
    subhandler: Option<(String, Vec<Attr>)>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: Level::Info,
            handler: None,
            clock: Arc::new(RealTime),
            error_extractor: Arc::new(PlainErrorExtractor),
            subhandler: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set minimum log level from its text encoding; unknown text means INFO
    #[must_use = "builder methods return a new value"]
    pub fn min_level_str(mut self, level: &str) -> Self {
        self.min_level = Level::parse(level);
        self
    }

    /// Use `handler` instead of the default stdout text handler
    ///
    /// The builder's error extractor only reaches the default handler; a
    /// custom [`RecordHandler`] takes its own through
    /// [`RecordHandler::with_error_extractor`].
    #[must_use = "builder methods return a new value"]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_extractor(mut self, extractor: Arc<dyn ErrorExtractor>) -> Self {
        self.error_extractor = extractor;
        self
    }

    /// Start the logger on a derived branch of the handler
    #[must_use = "builder methods return a new value"]
    pub fn subhandler(mut self, path_segment: impl Into<String>, attrs: Vec<Attr>) -> Self {
        self.subhandler = Some((path_segment.into(), attrs));
        self
    }

    /// Build the logger
    pub fn build(self) -> Logger {
        let error_extractor = self.error_extractor;
        let mut handler = match self.handler {
            Some(handler) => handler,
            None => default_handler(Arc::clone(&error_extractor)),
        };
        if let Some((segment, attrs)) = self.subhandler {
            handler = handler.subhandler(&segment, attrs);
        }

        Logger {
            handler,
            min_level: self.min_level,
            clock: self.clock,
            error_extractor,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_handler(error_extractor: Arc<dyn ErrorExtractor>) -> Arc<dyn Handler> {
    let stdout = Arc::new(SyncWriter::new(std::io::stdout()));
    let renderer = TextRenderer::new(stdout).with_colors(cfg!(feature = "console"));
    Arc::new(RecordHandler::new(Arc::new(renderer)).with_error_extractor(error_extractor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timestamp::FixedClock;
    use crate::core::value::Value;
    use chrono::{TimeZone, Utc};

    fn capture_logger(level: Level) -> (Logger, Arc<SyncWriter<Vec<u8>>>) {
        let out = Arc::new(SyncWriter::new(Vec::new()));
        let handler = RecordHandler::new(Arc::new(JsonRenderer::new(out.clone())));
        let logger = Logger::builder()
            .min_level(level)
            .handler(Arc::new(handler))
            .clock(Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )))
            .build();
        (logger, out)
    }

    fn lines(out: &SyncWriter<Vec<u8>>) -> Vec<serde_json::Value> {
        out.contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("deadline exceeded")
        }
    }

    impl Error for Timeout {}

    #[test]
    fn test_level_gating() {
        let (logger, out) = capture_logger(Level::Warn);
        let ctx = Context::background();

        logger.debug(&ctx, "d", vec![]);
        logger.info(&ctx, "i", vec![]);
        logger.warn(&ctx, "w", vec![]);
        logger.error(&ctx, "e", vec![]);

        let msgs: Vec<String> = lines(&out)
            .iter()
            .map(|l| l["msg"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(msgs, vec!["w", "e"]);
    }

    #[test]
    fn test_none_disables_everything() {
        let (logger, out) = capture_logger(Level::None);
        logger.error(&Context::background(), "e", vec![]);
        logger.log(&Context::background(), Level::None, "n", vec![]);
        assert!(!logger.enabled(Level::None));
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_none_call_dropped_at_any_floor() {
        let (logger, out) = capture_logger(Level::Debug);
        assert!(!logger.enabled(Level::None));
        logger.log(&Context::background(), Level::None, "n", vec![]);
        crate::log!(logger, &Context::background(), Level::None, "n{}", 1);
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_caller_is_call_site() {
        let (logger, out) = capture_logger(Level::Debug);
        let line = line!() + 1;
        logger.info(&Context::background(), "here", vec![]);

        let record = &lines(&out)[0];
        let file = record["src"]["file"].as_str().unwrap();
        assert!(file.ends_with(&format!("logger.rs:{}", line)), "got {}", file);
    }

    #[test]
    fn test_clock_drives_timestamp() {
        let (logger, out) = capture_logger(Level::Debug);
        logger.info(&Context::background(), "tick", vec![]);

        let record = &lines(&out)[0];
        assert_eq!(record["t"]["time"], "2024-01-01T00:00:00Z");
        assert_eq!(record["t"]["unix_us"], 1_704_067_200_000_000_i64);
    }

    #[test]
    fn test_err_group_precedes_callsite_attrs() {
        let (logger, out) = capture_logger(Level::Debug);
        logger.err(
            &Context::background(),
            &Timeout,
            vec![Attr::new("err", "shadowed"), Attr::new("retry", 3)],
        );
        logger.warn_err(&Context::background(), &Timeout, vec![]);

        let records = lines(&out);
        assert_eq!(records[0]["level"], "ERROR");
        assert_eq!(records[0]["msg"], "plain-error");
        assert_eq!(records[0]["err"]["msg"], "deadline exceeded");
        assert_eq!(records[0]["err"]["trace"], "NONE");
        assert_eq!(records[0]["retry"], 3);
        assert_eq!(records[1]["level"], "WARN");
    }

    #[test]
    fn test_custom_error_extractor() {
        let (logger, out) = capture_logger(Level::Debug);
        let logger = Logger {
            error_extractor: Arc::new(
                crate::core::error_fields::DowncastExtractor::new()
                    .with_message(|_: &Timeout| "upstream slow".to_string()),
            ),
            ..logger
        };
        logger.err(&Context::background(), &Timeout, vec![]);
        assert_eq!(lines(&out)[0]["msg"], "upstream slow");
    }

    #[test]
    fn test_sublogger_keeps_parent_untouched() {
        let (root, out) = capture_logger(Level::Debug);
        let child = root.sublogger("db", vec![Attr::new("pool", "main")]);

        child.info(&Context::background(), "child", vec![]);
        root.info(&Context::background(), "root", vec![]);

        let records = lines(&out);
        assert_eq!(records[0]["mod"], ".db");
        assert_eq!(records[0]["pool"], "main");
        assert!(records[1].get("mod").is_none());
        assert!(records[1].get("pool").is_none());
    }

    #[test]
    fn test_builder_subhandler_and_level_text() {
        let out = Arc::new(SyncWriter::new(Vec::new()));
        let handler = RecordHandler::new(Arc::new(TextRenderer::new(out.clone())));
        let logger = Logger::builder()
            .min_level_str("bogus")
            .handler(Arc::new(handler))
            .subhandler("api", vec![Attr::new("v", Value::from(2_u8))])
            .build();

        assert_eq!(logger.min_level(), Level::Info);
        logger.info(&Context::background(), "up", vec![]);
        let line = out.contents();
        assert!(line.contains(" mod=.api v=2"), "got {}", line);
    }

    #[test]
    fn test_from_config_rejects_colliding_keys() {
        let mut config = LoggerConfig::default();
        config.handler.path_key = "t".to_string();
        let sink = Arc::new(SyncWriter::new(Vec::new()));
        assert!(Logger::from_config(&config, sink).is_err());
    }
}
