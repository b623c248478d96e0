//! Basic logger usage example
//!
//! Demonstrates the default stdout logger, levels, call-site attributes and
//! error values.
//!
//! Run with: cargo run --example basic_usage

use context_logger::prelude::*;
use context_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Context Logger - Basic Usage Example ===\n");

    // Text lines on stdout, INFO and above
    let logger = Logger::new();
    let ctx = Context::background();

    println!("1. Logging at different levels:");
    logger.debug(&ctx, "This is a debug message (hidden)", vec![]);
    logger.info(&ctx, "This is an info message", vec![]);
    logger.warn(&ctx, "This is a warning message", vec![]);
    logger.error(&ctx, "This is an error message", vec![]);

    println!("\n2. Call-site attributes:");
    logger.info(
        &ctx,
        "Server listening",
        vec![Attr::new("port", 8080), Attr::new("tls", true)],
    );
    info!(logger, &ctx, ["user_id" => 42, "action" => "login"], "User {} signed in", "alice");

    println!("\n3. Minimum level from configuration text:");
    let verbose = Logger::builder().min_level_str("DEBUG").build();
    verbose.debug(&ctx, "Debug message (visible)", vec![]);

    println!("\n4. Logging error values:");
    let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "cannot open /var/run/app.pid");
    logger.err(&ctx, &err, vec![Attr::new("attempt", 3)]);
    warn!(logger, &ctx, "Falling back to {}", "/tmp/app.pid");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
