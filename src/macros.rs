//! Logging macros for ergonomic log message formatting.
//!
//! These macros check the level before formatting, so disabled records cost
//! a comparison. They also record the module path of the call site.
//!
//! # Examples
//!
//! ```
//! use context_logger::prelude::*;
//! use context_logger::info;
//!
//! let logger = Logger::new();
//! let ctx = Context::background();
//!
//! // Basic logging
//! info!(logger, &ctx, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, &ctx, "Server listening on port {}", port);
//!
//! // With call-site attributes
//! info!(logger, &ctx, ["user_id" => 42, "action" => "login"], "User action");
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use context_logger::prelude::*;
/// # let logger = Logger::new();
/// # let ctx = Context::background();
/// use context_logger::log;
/// log!(logger, &ctx, Level::Info, "Simple message");
/// log!(logger, &ctx, Level::Error, ["code" => 500], "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $ctx:expr, $level:expr, [$($key:expr => $value:expr),* $(,)?], $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log_with_caller(
                $ctx,
                level,
                $crate::Caller::capture_in(module_path!()),
                format!($($arg)+),
                vec![$($crate::Attr::new($key, $value)),*],
            );
        }
    }};
    ($logger:expr, $ctx:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $level, [], $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use context_logger::prelude::*;
/// # let logger = Logger::builder().min_level(Level::Debug).build();
/// # let ctx = Context::background();
/// use context_logger::debug;
/// debug!(logger, &ctx, "Debug information");
/// debug!(logger, &ctx, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::Level::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use context_logger::prelude::*;
/// # let logger = Logger::new();
/// # let ctx = Context::background();
/// use context_logger::warn;
/// warn!(logger, &ctx, ["free_mb" => 12], "Low disk space");
/// warn!(logger, &ctx, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::Level::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::Level::Error, $($arg)+)
    };
}
