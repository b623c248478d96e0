//! Handler and renderer traits
//!
//! A `Handler` turns events into records and owns the per-branch state of a
//! logger hierarchy. A `Renderer` turns records into output.

use super::{error::Result, event::Event, event::Record, level::Level, value::Attr};
use std::sync::Arc;

pub trait Handler: Send + Sync {
    /// Whether records at `level` would be emitted by this handler
    fn enabled(&self, level: Level) -> bool;

    /// Merge, normalize and forward an event
    ///
    /// Downstream failures are reported out of band and never returned.
    fn handle(&self, event: Event);

    /// Derive a handler for a sub-branch
    ///
    /// An empty `path_segment` leaves the path unchanged. Keys in `attrs`
    /// already registered on this branch are skipped.
    fn subhandler(&self, path_segment: &str, attrs: Vec<Attr>) -> Arc<dyn Handler>;
}

/// Output stage fed by a handler
///
/// Implementations must be safe to call from many threads at once.
pub trait Renderer: Send + Sync {
    /// The renderer's own severity floor
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn render(&self, record: &Record) -> Result<()>;

    fn name(&self) -> &str;
}
