use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use loan_ledger::{Ledger, LedgerCommand, LenderKey, initialize_db, save_ledger};

/// A utility for creating a test database for the loan ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample loans...");

    let ledger = sample_commands()
        .iter()
        .try_fold(Ledger::new(), |ledger, command| ledger.apply(command))?;

    save_ledger(&ledger, &conn)?;

    println!("Created {} lenders.", ledger.len());
    println!("Success!");

    Ok(())
}

fn sample_commands() -> Vec<LedgerCommand> {
    let loan = |lender: &str, amount: &str, purpose: &str| LedgerCommand::RecordLoan {
        lender: lender.to_owned(),
        amount: amount.to_owned(),
        purpose: purpose.to_owned(),
    };
    let repayment = |lender: &str, amount: &str| LedgerCommand::RecordRepayment {
        lender: LenderKey::new_unchecked(lender),
        amount: amount.to_owned(),
    };

    vec![
        loan("Chase", "25000", "Land Purchase"),
        loan("Chase", "4200.50", "Fencing"),
        loan("Bank of America", "1800", "Car Repairs"),
        loan("Credit Union", "650", "Laptop"),
        repayment("CHASE", "5000"),
        repayment("BANK OF AMERICA", "1800"),
        repayment("CREDIT UNION", "700"),
    ]
}
