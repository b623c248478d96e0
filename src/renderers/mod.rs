//! Concrete renderers and line writers

pub mod async_writer;
pub mod json;
pub mod sync_writer;
pub mod text;

pub use async_writer::AsyncWriter;
pub use json::JsonRenderer;
pub use sync_writer::{LineSink, SyncWriter};
pub use text::TextRenderer;
