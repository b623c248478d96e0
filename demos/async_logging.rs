//! Async logging example
//!
//! Demonstrates queued JSON output to a file from several threads.
//!
//! Run with: cargo run --example async_logging

use context_logger::prelude::*;
use context_logger::renderers::AsyncWriter;
use context_logger::RecordHandler;
use std::fs::File;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Context Logger - Async Logging Example ===\n");

    let path = std::env::temp_dir().join("context_logger_async.log");
    let writer = Arc::new(AsyncWriter::new(File::create(&path)?, 10_000));
    let handler = Arc::new(RecordHandler::new(Arc::new(JsonRenderer::new(writer.clone()))));
    let metrics = Arc::clone(handler.metrics());

    let logger = Logger::builder()
        .min_level(Level::Debug)
        .handler(handler)
        .subhandler("worker_pool", vec![Attr::new("host", "node-1")])
        .build();

    println!("1. Logging from 4 threads...");
    let handles: Vec<_> = (0..4)
        .map(|id| {
            let logger = logger.sublogger(&format!("w{}", id), vec![]);
            thread::spawn(move || {
                let ctx = Context::background().with_attrs(vec![Attr::new("worker", id as u64)]);
                for job in 0..250 {
                    logger.debug(&ctx, "job finished", vec![Attr::new("job", job as u64)]);
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker thread panicked");
        }
    }

    writer.flush()?;

    println!("2. Wrote {} records to {}", metrics.records_emitted(), path.display());
    println!("   Lost records: {} ({:.2}%)", metrics.records_lost(), metrics.loss_rate());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
