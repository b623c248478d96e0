//! # Context Logger
//!
//! Structured, context-scoped logging for concurrent services.
//!
//! ## Features
//!
//! - **Context attributes**: attach fields to an execution [`Context`] once and
//!   every record logged under it carries them
//! - **Hierarchical loggers**: sub-loggers extend a dotted path and carry base
//!   attributes for their whole subtree
//! - **Deduplicated records**: each key appears once, base attributes win over
//!   context attributes, which win over call-site attributes
//! - **Lazy values**: [`LogValuer`] values are only computed for records that
//!   are actually emitted
//! - **Thread safe**: loggers, contexts and handlers are `Send + Sync` and
//!   cheap to clone
//!
//! ## Example
//!
//! ```
//! use context_logger::renderers::{SyncWriter, TextRenderer};
//! use context_logger::{Attr, Context, Logger, RecordHandler};
//! use std::sync::Arc;
//!
//! let out = Arc::new(SyncWriter::new(Vec::new()));
//! let handler = RecordHandler::new(Arc::new(TextRenderer::new(out.clone())));
//! let logger = Logger::builder().handler(Arc::new(handler)).build();
//!
//! let ctx = Context::background().with_attrs(vec![Attr::new("req_id", "abc")]);
//! logger.sublogger("svc", vec![]).info(&ctx, "started", vec![Attr::new("port", 8080)]);
//!
//! let line = out.contents();
//! assert!(line.contains("mod=.svc req_id=abc port=8080"));
//! ```

pub mod core;
pub mod macros;
pub mod renderers;

pub mod prelude {
    pub use crate::core::{
        Attr, Context, Handler, Level, LogValuer, Logger, LoggerBuilder, LoggerError, Renderer,
        Result, Value,
    };
    pub use crate::renderers::{JsonRenderer, LineSink, SyncWriter, TextRenderer};
}

pub use core::{
    extend_attrs, stderr_error_log, Attr, AttrChain, Caller, Clock, Context, DowncastExtractor,
    ErrorExtractor, ErrorLog, ErrorValue, Event, FixedClock, Frame, Handler, HandlerConfig, Level,
    LogValuer, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, OutputFormat,
    PlainErrorExtractor, RealTime, Record, RecordHandler, Renderer, Result, TimestampFormat, Value,
    RESOLVE_RECURSION_LIMIT,
};
