//! Randomly perturbs catalog rows to simulate e-commerce activity.
//!
//! Meant to run from cron every few hours with a randomized count, e.g.:
//!
//! ```text
//! 0 */6 * * *  modify-books --count $((RANDOM % 141 + 10)) --quiet
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use rand::thread_rng;

use bookstore_sync::{BookStore, FieldChange, MutationEngine, MutationOutcome, StoreError};

/// Ceiling on one run, matching the reference deployment.
const MAX_COUNT: usize = 500;

#[derive(Parser)]
#[command(name = "modify-books")]
#[command(about = "Randomly modify books to simulate e-commerce changes")]
#[command(version)]
struct Args {
    /// Number of books to modify (the scheduler typically passes 10-150)
    #[arg(long, default_value_t = 50)]
    count: usize,
    /// Database file path
    #[arg(long, default_value = "bookstore.db")]
    db: PathBuf,
    /// Single-line output for cron logs
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    if args.count > MAX_COUNT {
        eprintln!("count must be at most {}", MAX_COUNT);
        process::exit(2);
    }
    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), StoreError> {
    let store = BookStore::open(&args.db)?;
    let total = store.book_count()?;
    if total == 0 {
        println!(
            "No books in {}. Load the catalog first: curl -X POST http://localhost:5000/books/load-csv",
            args.db.display()
        );
        return Ok(());
    }

    let requested = args.count.min(total as usize);
    if !args.quiet {
        println!("{} books in database, modifying {} at random", total, requested);
        println!();
    }

    let outcome = MutationEngine::new(&store).run(requested, &mut thread_rng())?;

    if args.quiet {
        println!(
            "Modified {} books: {} prices, {} stock, {} ratings",
            outcome.touched.len(),
            outcome.price_changes,
            outcome.stock_changes,
            outcome.rating_changes
        );
    } else {
        print_report(&outcome);
    }
    Ok(())
}

fn print_report(outcome: &MutationOutcome) {
    for book in &outcome.touched {
        println!("{}", book.title);
        if book.changes.is_empty() {
            println!("   touched, no field changes");
        }
        for change in &book.changes {
            match change {
                FieldChange::Price { from, to } => {
                    println!("   price: ${:.2} -> ${:.2}", from, to)
                }
                FieldChange::Stock { from, to } => println!("   stock: {} -> {}", from, to),
                FieldChange::Rating { to } => println!("   rating: -> {:.2}", to),
            }
        }
        println!();
    }
    println!(
        "Done: {} books touched ({} price, {} stock, {} rating changes)",
        outcome.touched.len(),
        outcome.price_changes,
        outcome.stock_changes,
        outcome.rating_changes
    );
    println!();
    println!("Check changed books with:");
    println!("   curl http://localhost:5000/books/changed");
    println!("   curl 'http://localhost:5000/books/changed?hours=1'");
}
