//! Turning error values into log fields
//!
//! Arbitrary error types may or may not carry a user-facing message or a
//! stack trace. An [`ErrorExtractor`] knows which ones do.

use super::value::{Attr, Value};
use std::error::Error;
use std::sync::Arc;

/// Record message used when no extractor yields one
pub const FALLBACK_ERROR_MESSAGE: &str = "plain-error";

/// Trace text used when no extractor yields one
pub const NO_TRACE: &str = "NONE";

/// Key of the error group attribute
pub const ERROR_KEY: &str = "err";

pub trait ErrorExtractor: Send + Sync {
    /// A short user-facing message for the error, used as the record message
    fn message(&self, err: &(dyn Error + 'static)) -> Option<String>;

    /// A stack trace for the error
    fn stack(&self, err: &(dyn Error + 'static)) -> Option<String>;
}

/// Extractor for errors with no extra capabilities
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainErrorExtractor;

impl ErrorExtractor for PlainErrorExtractor {
    fn message(&self, _err: &(dyn Error + 'static)) -> Option<String> {
        None
    }

    fn stack(&self, _err: &(dyn Error + 'static)) -> Option<String> {
        None
    }
}

type Matcher = Arc<dyn Fn(&(dyn Error + 'static)) -> Option<String> + Send + Sync>;

/// Extractor driven by typed closures
///
/// Each registered closure is tried against the error and every error in
/// its `source()` chain, outermost first. The first hit wins.
///
/// ```
/// use context_logger::{DowncastExtractor, ErrorExtractor};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct NotFound(&'static str);
///
/// impl fmt::Display for NotFound {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "no row with id {}", self.0)
///     }
/// }
///
/// impl std::error::Error for NotFound {}
///
/// let extractor = DowncastExtractor::new()
///     .with_message(|e: &NotFound| format!("{} not found", e.0));
///
/// assert_eq!(
///     extractor.message(&NotFound("user")),
///     Some("user not found".to_string())
/// );
/// ```
#[derive(Clone, Default)]
pub struct DowncastExtractor {
    messages: Vec<Matcher>,
    stacks: Vec<Matcher>,
}

impl DowncastExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message<E, F>(mut self, f: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E) -> String + Send + Sync + 'static,
    {
        self.messages.push(matcher(f));
        self
    }

    #[must_use]
    pub fn with_stack<E, F>(mut self, f: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E) -> String + Send + Sync + 'static,
    {
        self.stacks.push(matcher(f));
        self
    }
}

fn matcher<E, F>(f: F) -> Matcher
where
    E: Error + 'static,
    F: Fn(&E) -> String + Send + Sync + 'static,
{
    Arc::new(move |err: &(dyn Error + 'static)| err.downcast_ref::<E>().map(&f))
}

fn first_in_chain(matchers: &[Matcher], err: &(dyn Error + 'static)) -> Option<String> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = matchers.iter().find_map(|p| p(e)) {
            return Some(found);
        }
        current = e.source();
    }
    None
}

impl ErrorExtractor for DowncastExtractor {
    fn message(&self, err: &(dyn Error + 'static)) -> Option<String> {
        first_in_chain(&self.messages, err)
    }

    fn stack(&self, err: &(dyn Error + 'static)) -> Option<String> {
        first_in_chain(&self.stacks, err)
    }
}

/// The `{msg, trace}` group describing an error
pub fn error_value(extractor: &dyn ErrorExtractor, err: &(dyn Error + 'static)) -> Value {
    let trace = extractor.stack(err).unwrap_or_else(|| NO_TRACE.to_string());
    Value::Group(vec![
        Attr::new("msg", err.to_string()),
        Attr::new("trace", trace),
    ])
}

/// Build the record message and the `err` group for an error
pub fn error_fields(extractor: &dyn ErrorExtractor, err: &(dyn Error + 'static)) -> (String, Attr) {
    let message = extractor
        .message(err)
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
    (message, Attr::new(ERROR_KEY, error_value(extractor, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection reset")
        }
    }

    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("query failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    fn group_value<'a>(attr: &'a Attr, key: &str) -> Option<&'a Value> {
        attr.value
            .as_group()?
            .iter()
            .find(|a| a.key == key)
            .map(|a| &a.value)
    }

    #[test]
    fn test_plain_error_fields() {
        let (message, attr) = error_fields(&PlainErrorExtractor, &Inner);

        assert_eq!(message, "plain-error");
        assert_eq!(attr.key, "err");
        assert_eq!(group_value(&attr, "msg"), Some(&Value::from("connection reset")));
        assert_eq!(group_value(&attr, "trace"), Some(&Value::from("NONE")));
    }

    #[test]
    fn test_downcast_walks_source_chain() {
        let extractor = DowncastExtractor::new()
            .with_message(|_: &Inner| "database unavailable".to_string())
            .with_stack(|_: &Inner| "at db::connect".to_string());

        let (message, attr) = error_fields(&extractor, &Outer(Inner));
        assert_eq!(message, "database unavailable");
        assert_eq!(group_value(&attr, "msg"), Some(&Value::from("query failed")));
        assert_eq!(group_value(&attr, "trace"), Some(&Value::from("at db::connect")));
    }

    #[test]
    fn test_outermost_match_wins() {
        let extractor = DowncastExtractor::new()
            .with_message(|_: &Inner| "inner".to_string())
            .with_message(|_: &Outer| "outer".to_string());

        assert_eq!(extractor.message(&Outer(Inner)), Some("outer".to_string()));
        assert_eq!(extractor.stack(&Outer(Inner)), None);
    }
}
