//! logfmt-style text renderer

use super::sync_writer::LineSink;
use crate::core::{
    config::{LEVEL_KEY, MESSAGE_KEY},
    Attr, Level, Record, Renderer, Result, Value,
};
use std::fmt::Write as _;
use std::sync::Arc;

#[cfg(feature = "console")]
use colored::Colorize;

/// Renders each record as one `key=value` line
///
/// ```text
/// level=INFO msg="server started" t.time=2024-01-01T00:00:00Z t.unix_us=1704067200000000 port=8080
/// ```
///
/// Group values are flattened into `group.key` pairs. Keys outside
/// `[A-Za-z0-9_-]` and values with spaces, quotes, `=` or control characters
/// are quoted, so every record stays on one line with distinct keys.
pub struct TextRenderer {
    sink: Arc<dyn LineSink>,
    min_level: Level,
    use_colors: bool,
}

impl TextRenderer {
    pub fn new(sink: Arc<dyn LineSink>) -> Self {
        Self {
            sink,
            min_level: Level::Debug,
            use_colors: false,
        }
    }

    /// Renderer-local severity floor, independent of the logger's level
    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Color the level with ANSI escapes (needs the `console` feature)
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Encode a record without writing it
    pub fn format(&self, record: &Record) -> String {
        let mut line = String::with_capacity(128);
        let _ = write!(line, "{}={}", LEVEL_KEY, self.level_text(record.level));
        let _ = write!(
            line,
            " {}={}",
            MESSAGE_KEY,
            quote_value(&record.message)
        );

        for attr in &record.attrs {
            write_attr(&mut line, "", attr);
        }
        line
    }

    #[cfg(feature = "console")]
    fn level_text(&self, level: Level) -> String {
        if self.use_colors {
            level.to_str().color(level.color_code()).to_string()
        } else {
            level.to_str().to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_text(&self, level: Level) -> String {
        level.to_str().to_string()
    }
}

impl Renderer for TextRenderer {
    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    fn render(&self, record: &Record) -> Result<()> {
        let mut line = self.format(record);
        line.push('\n');
        self.sink.write_line(line.as_bytes())
    }

    fn name(&self) -> &str {
        "text"
    }
}

fn write_attr(line: &mut String, prefix: &str, attr: &Attr) {
    // empty keys are never written; an empty-keyed group inlines its members
    if attr.key.is_empty() {
        if let Value::Group(members) = &attr.value {
            for member in members {
                write_attr(line, prefix, member);
            }
        }
        return;
    }

    let key = escape_key(&attr.key);
    let full_key = if prefix.is_empty() {
        key
    } else {
        format!("{}.{}", prefix, key)
    };

    match &attr.value {
        Value::Group(members) => {
            for member in members {
                write_attr(line, &full_key, member);
            }
        }
        Value::String(s) => {
            let _ = write!(line, " {}={}", full_key, escape_value(s));
        }
        other => {
            let _ = write!(line, " {}={}", full_key, escape_value(&other.to_string()));
        }
    }
}

fn is_bare(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn escape_key(key: &str) -> String {
    if is_bare(key) {
        key.to_string()
    } else {
        quote_value(key)
    }
}

fn escape_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c == ' ' || c == '"' || c == '=' || c.is_control());
    if needs_quotes {
        quote_value(value)
    } else {
        value.to_string()
    }
}

/// Quote and escape so the result never spans lines
fn quote_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:04x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
