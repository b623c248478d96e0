//! Context scoping example
//!
//! Demonstrates sub-loggers, context attributes, lazy values and how
//! duplicate keys are resolved.
//!
//! Run with: cargo run --example context_scoping

use context_logger::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn handle_request(logger: &Logger, ctx: &Context, path: &str) {
    // Everything logged under this context carries the route
    let ctx = ctx.with_attrs(vec![Attr::new("route", path.to_string())]);
    logger.info(&ctx, "request received", vec![]);

    let db = logger.sublogger("db", vec![Attr::new("pool", "primary")]);
    db.debug(&ctx, "query planned", vec![Attr::new("table", "users")]);
    db.info(&ctx, "query executed", vec![Attr::new("rows", 3)]);
}

fn main() -> Result<()> {
    println!("=== Context Logger - Context Scoping Example ===\n");

    let root = Logger::builder().min_level(Level::Debug).build();
    let api = root.sublogger("api", vec![Attr::new("env", "prod")]);

    println!("1. Request scoped attributes:");
    let requests = Arc::new(AtomicU64::new(0));
    for (req_id, path) in [("req-1", "/users"), ("req-2", "/orders")] {
        let ctx = Context::background().with_attrs(vec![Attr::new("req_id", req_id)]);
        requests.fetch_add(1, Ordering::Relaxed);
        handle_request(&api, &ctx, path);
    }

    println!("\n2. Base attributes win over context and call-site attributes:");
    let ctx = Context::background().with_attrs(vec![Attr::new("env", "staging")]);
    api.info(&ctx, "env is always prod here", vec![Attr::new("env", "dev")]);

    println!("\n3. Lazy values are computed per emitted record:");
    let counter = Arc::clone(&requests);
    let stats = root.sublogger(
        "stats",
        vec![Attr::lazy("requests_seen", move || {
            Value::from(counter.load(Ordering::Relaxed))
        })],
    );
    stats.info(&Context::background(), "snapshot", vec![]);
    requests.fetch_add(10, Ordering::Relaxed);
    stats.info(&Context::background(), "snapshot", vec![]);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
