use std::path::PathBuf;
use std::process;
use clap::Parser;
use log::error;
use crate::expense_store::ExpenseStore;
use crate::menu::Menu;

mod csv_handler;
mod error;
mod expense_store;
mod menu;

#[derive(Parser, Debug)]
#[command(version, about = "Track personal expenses in a CSV file")]
struct Args {
    /// CSV file holding the expenses, created if missing
    #[arg(short, long, env = "EXPENSE_FILE", default_value = "expenses.csv")]
    file: PathBuf,

    /// Symbol printed in front of amounts
    #[arg(short, long, env = "EXPENSE_CURRENCY", default_value = "₹")]
    currency: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let store = ExpenseStore::new(args.file);
    let stdin = std::io::stdin();
    let mut menu = Menu::new(&store, stdin.lock(), std::io::stdout(), &args.currency);
    if let Err(e) = menu.run() {
        error!("Expense file {} is unusable: {}", store.path().display(), e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
