//! Demo 1: Order Monitor
//!
//! Showcases: directory watching, observer notifications, export on shutdown
//!
//! Drop `.json` / `.xml` order files into the import directory and watch them
//! appear. Press Ctrl+C to stop; every order is then exported.
//!
//! Run: cargo run --bin order_monitor -- <import-dir>
//!
//! Environment:
//!   ORDER_IMPORT_DIR  import directory when no argument is given
//!   ORDER_EXPORT_DIR  export/restore directory (optional)
//!   RUST_LOG          log filter, default "info"

use colored::*;
use order_tracker::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn import_dir() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("ORDER_IMPORT_DIR"))
        .map(PathBuf::from)
}

fn print_order(order: &OrderRecord) {
    let timestamp = chrono::Local::now().format("%H:%M:%S");
    println!(
        "  {} {} {} {} from {} - {} item(s), ${:.2}",
        format!("[{}]", timestamp).dimmed(),
        "NEW".green().bold(),
        order.id().to_string().yellow(),
        type_label(order.order_type()),
        order.company().unwrap_or("unknown").cyan(),
        order.items().len(),
        order.total_price()
    );
}

fn print_change(order: &OrderRecord) {
    let timestamp = chrono::Local::now().format("%H:%M:%S");
    let status = match order.status() {
        OrderStatus::Waiting => status_label(order.status()).normal(),
        OrderStatus::InProgress => status_label(order.status()).yellow(),
        OrderStatus::Completed => status_label(order.status()).green(),
        OrderStatus::Cancelled => status_label(order.status()).red(),
    };
    println!(
        "  {} {} {} is now {}",
        format!("[{}]", timestamp).dimmed(),
        "UPD".blue().bold(),
        order.id().to_string().yellow(),
        status
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Some(dir) = import_dir() else {
        eprintln!("usage: order_monitor <import-dir>  (or set ORDER_IMPORT_DIR)");
        std::process::exit(2);
    };

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  ORDER MONITOR".cyan().bold());
    println!("  Watching {}", dir.display().to_string().white().bold());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let mut builder = OrderTracker::builder(&dir);
    if let Some(export) = std::env::var_os("ORDER_EXPORT_DIR") {
        builder = builder.with_export_dir(export);
    }
    let tracker = builder.build()?;

    tracker.registry().add_observer(Arc::new(
        OrderHooks::new().on_added(print_order).on_changed(print_change),
    ));

    let restored = tracker.start().await?;
    if restored > 0 {
        println!("  {} Restored {} order(s)\n", "✓".green(), restored);
    }

    tokio::signal::ctrl_c().await?;
    println!("\n  Shutting down...");

    let exported = tracker.shutdown().await?;
    let stats = tracker.stats();
    let counts = tracker.registry().count_by_status();

    println!();
    println!("{}", "═".repeat(65).cyan());
    println!(
        "  Files: {}  Ingested: {}  Rejected: {}",
        stats.files_seen, stats.orders_ingested, stats.parse_failures
    );
    println!(
        "  Waiting: {}  In progress: {}  Completed: {}  Cancelled: {}",
        counts.waiting, counts.in_progress, counts.completed, counts.cancelled
    );
    if !exported.is_empty() {
        println!("  {} Exported {} order(s)", "✓".green(), exported.len());
    }
    println!("{}", "═".repeat(65).cyan());

    Ok(())
}
