//! Call-site capture
//!
//! Capturing is a pointer copy made at the log call through
//! `#[track_caller]`. Turning it into printable location data is deferred
//! until a handler actually emits the record.

use std::fmt;
use std::panic::Location;

/// Raw handle to the source location of a log statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    location: &'static Location<'static>,
    module: Option<&'static str>,
}

impl Caller {
    /// Capture the location of the nearest caller not marked `#[track_caller]`
    #[track_caller]
    #[inline]
    pub fn capture() -> Self {
        Self {
            location: Location::caller(),
            module: None,
        }
    }

    /// Capture the location and record the module path of the call site
    ///
    /// Used by the logging macros, which can see `module_path!()`.
    #[track_caller]
    #[inline]
    pub fn capture_in(module: &'static str) -> Self {
        Self {
            location: Location::caller(),
            module: Some(module),
        }
    }

    /// Resolve the handle into printable frame data
    pub fn resolve(&self) -> Frame {
        Frame {
            function: self.module.map(str::to_string),
            file: self.location.file().to_string(),
            line: self.location.line(),
            column: self.location.column(),
        }
    }
}

/// Resolved call-site information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Enclosing module path, when the capture site supplied it
    pub function: Option<String>,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Frame {
    /// `file:line`
    pub fn file_line(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{} {}:{}", function, self.file, self.line),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn wrapper() -> Caller {
        Caller::capture()
    }

    #[test]
    fn test_capture_reports_this_file() {
        let caller = Caller::capture();
        let frame = caller.resolve();
        assert!(frame.file.ends_with("caller.rs"));
        assert_eq!(frame.line, line!() - 3);
        assert!(frame.function.is_none());
    }

    #[test]
    fn test_track_caller_skips_wrapper() {
        let expected = line!() + 1;
        let caller = wrapper();
        assert_eq!(caller.resolve().line, expected);
    }

    #[test]
    fn test_capture_in_module() {
        let frame = Caller::capture_in(module_path!()).resolve();
        assert_eq!(frame.function.as_deref(), Some(module_path!()));
        assert!(frame.to_string().starts_with(module_path!()));
        assert!(frame.file_line().contains("caller.rs:"));
    }
}
