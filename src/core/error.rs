//! Error types for the logger system

use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Side-channel sink for failures inside the logging pipeline
///
/// Record handlers never return errors to the caller of a log operation.
/// Failures are handed to this callback instead so they stay observable.
pub type ErrorLog = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Default side channel: one line on stderr per failure
pub fn stderr_error_log() -> ErrorLog {
    Arc::new(|err: &LoggerError| {
        eprintln!("[LOGGER ERROR] {}", err);
    })
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Renderer returned an error
    #[error("Renderer '{renderer}' failed: {message}")]
    RenderFailed { renderer: String, message: String },

    /// Renderer panicked while handling a record
    #[error("Renderer '{renderer}' panicked: {message}")]
    RenderPanicked { renderer: String, message: String },

    /// A lazy value or error extractor panicked while a record was built
    #[error("Value of '{key}' panicked while resolving: {message}")]
    ValuePanicked { key: String, message: String },

    /// Lazy value resolution exceeded the recursion limit
    #[error("Exceeded value resolve recursion: value type {type_name}")]
    ResolveOverflow { type_name: String },

    /// Writer worker is gone
    #[error("Writer closed")]
    WriterClosed,

    /// Writer queue full
    #[error("Writer queue full: {capacity} lines buffered")]
    QueueFull { capacity: usize },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a renderer failure error
    pub fn render_failed(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::RenderFailed {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    /// Create a renderer panic error
    pub fn render_panicked(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::RenderPanicked {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    pub fn value_panicked(key: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ValuePanicked {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a resolution overflow error for a value of the named type
    pub fn resolve_overflow(type_name: impl Into<String>) -> Self {
        LoggerError::ResolveOverflow {
            type_name: type_name.into(),
        }
    }

    /// Create a queue full error
    pub fn queue_full(capacity: usize) -> Self {
        LoggerError::QueueFull { capacity }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
