//! Demo 2: Kitchen Console
//!
//! Showcases: lifecycle operations, undo, filtered views
//!
//! A terminal stand-in for the order screen: orders arrive from the import
//! directory and are moved along with typed commands.
//!
//! Run: cargo run --bin kitchen_console -- <import-dir>
//!
//! Commands:
//!   list | active | done | cancelled
//!   show <id> | start <id> | complete <id> | cancel <id> | uncancel <id>
//!   undo | stats | quit

use colored::*;
use order_tracker::prelude::*;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

enum Command {
    List(Vec<OrderRecord>),
    Show(OrderId),
    Apply(Transition, OrderId),
    Undo,
    Stats,
    Quit,
    Help,
}

fn parse_id(arg: Option<&str>) -> Option<OrderId> {
    arg?.trim_start_matches('#').parse::<u32>().ok().map(OrderId::new)
}

fn parse_command(line: &str, registry: &OrderRegistry) -> Option<Command> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let id = parse_id(words.next());

    let command = match (verb, id) {
        ("list", _) => Command::List(registry.orders()),
        ("active", _) => Command::List(registry.incomplete_orders()),
        ("done", _) => Command::List(registry.completed_orders()),
        ("cancelled", _) => Command::List(registry.cancelled_orders()),
        ("show", Some(id)) => Command::Show(id),
        ("start", Some(id)) => Command::Apply(Transition::Start, id),
        ("complete", Some(id)) => Command::Apply(Transition::Complete, id),
        ("cancel", Some(id)) => Command::Apply(Transition::Cancel, id),
        ("uncancel", Some(id)) => Command::Apply(Transition::Uncancel, id),
        ("undo", _) => Command::Undo,
        ("stats", _) => Command::Stats,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Help,
    };
    Some(command)
}

fn apply(registry: &OrderRegistry, transition: Transition, id: OrderId) -> bool {
    match transition {
        Transition::Start => registry.start_order(id),
        Transition::Complete => registry.complete_order(id),
        Transition::Cancel => registry.cancel_order(id),
        Transition::Uncancel => registry.uncancel_order(id),
    }
}

fn print_row(order: &OrderRecord) {
    println!(
        "  {:>5}  {:<12} {:<9} {:>3} item(s)  ${:.2}",
        order.id().to_string().yellow(),
        status_label(order.status()),
        type_label(order.order_type()),
        order.items().len(),
        order.total_price()
    );
}

fn print_help() {
    println!("  list | active | done | cancelled");
    println!("  show <id> | start <id> | complete <id> | cancel <id> | uncancel <id>");
    println!("  undo | stats | quit");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let dir = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("ORDER_IMPORT_DIR"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut builder = OrderTracker::builder(&dir);
    if let Some(export) = std::env::var_os("ORDER_EXPORT_DIR") {
        builder = builder.with_export_dir(export);
    }
    let tracker = builder.build()?;
    tracker.start().await?;

    println!("{}", "  KITCHEN CONSOLE".cyan().bold());
    println!("  Orders from {}\n", dir.display());
    print_help();

    let registry = tracker.registry().clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_command(&line, &registry) {
            None => continue,
            Some(Command::List(orders)) => {
                if orders.is_empty() {
                    println!("  {}", "(none)".dimmed());
                }
                orders.iter().for_each(print_row);
            }
            Some(Command::Show(id)) => match registry.get(id) {
                Some(order) => println!("{order}\n"),
                None => println!("  {} no order {id}", "✗".red()),
            },
            Some(Command::Apply(transition, id)) => {
                if apply(&registry, transition, id) {
                    println!("  {} {transition} {id}", "✓".green());
                } else {
                    let current = registry
                        .get(id)
                        .map(|o| status_label(o.status()))
                        .unwrap_or("unknown order");
                    println!("  {} cannot {transition} {id} ({current})", "✗".red());
                }
            }
            Some(Command::Undo) => {
                if registry.undo_last_cancel() {
                    println!("  {} cancel undone", "✓".green());
                } else {
                    println!("  {} nothing to undo", "✗".red());
                }
            }
            Some(Command::Stats) => {
                let stats = tracker.stats();
                let counts = registry.count_by_status();
                println!(
                    "  files {} / ingested {} / rejected {} / restored {}",
                    stats.files_seen, stats.orders_ingested, stats.parse_failures, stats.orders_restored
                );
                println!(
                    "  waiting {} / in progress {} / completed {} / cancelled {}",
                    counts.waiting, counts.in_progress, counts.completed, counts.cancelled
                );
            }
            Some(Command::Quit) => break,
            Some(Command::Help) => print_help(),
        }
    }

    match tracker.shutdown().await {
        Ok(exported) if !exported.is_empty() => {
            println!("  {} Exported {} order(s)", "✓".green(), exported.len())
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Shutdown reported an error"),
    }
    Ok(())
}
