//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod context;
pub mod error;
pub mod error_fields;
pub mod event;
pub mod handler;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod record_handler;
pub mod timestamp;
pub mod value;

pub use caller::{Caller, Frame};
pub use config::{HandlerConfig, LoggerConfig, OutputFormat};
pub use context::{extend_attrs, AttrChain, Context};
pub use error::{stderr_error_log, ErrorLog, LoggerError, Result};
pub use error_fields::{DowncastExtractor, ErrorExtractor, PlainErrorExtractor};
pub use event::{Event, Record};
pub use handler::{Handler, Renderer};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use record_handler::RecordHandler;
pub use timestamp::{Clock, FixedClock, RealTime, TimestampFormat};
pub use value::{Attr, ErrorValue, LogValuer, Value, RESOLVE_RECURSION_LIMIT};
